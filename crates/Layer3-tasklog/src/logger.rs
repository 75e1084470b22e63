//! Task logger - 태스크 완료 시 감사 기록 작성
//!
//! ```text
//! task.completed(taskId)
//!   │
//!   ├─ generate_task_config          (ConfigMissing은 그대로 전파)
//!   ├─ task_with_id(taskId)          → task dir
//!   ├─ settings / env / host / workspace 스냅샷
//!   ├─ system_prompt.json, api_provider.json
//!   ├─ copy → <cwd>/.aos/task-log/entry/<taskId>
//!   ├─ locate "aos-data-pool" (위로 탐색)
//!   └─ copy → <pool>/task-log/entry/<taskId>
//! ```

use crate::import_export::export_settings;
use crate::snapshot::{gather_host_info_and_write, log_workspace_folders, write_env_vars};
use crate::task_config::generate_task_config;
use aos_foundation::event::{TASK_ABORTED, TASK_COMPLETED, TASK_DELETED, TASK_STARTED};
use aos_foundation::{
    copy_dir, locate_folder, write_json_pretty, AosConfig, AosEvent, EventCategory, EventListener,
    OutputChannel, Result, TokenUsage,
};
use aos_host::HostServices;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

// 태스크 디렉토리에 쓰는 파일들
pub const SYSTEM_PROMPT_FILE: &str = "system_prompt.json";
pub const API_PROVIDER_FILE: &str = "api_provider.json";
pub const SETTINGS_SNAPSHOT_FILE: &str = "roo-code-settings.json";
pub const ENV_VARS_FILE: &str = "env_vars.json";
pub const HOST_FILE: &str = "host.json";
pub const WORKSPACE_FILE: &str = "vscode_workspace.json";

/// 태스크 기록 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskLogOutcome {
    /// 로컬과 데이터 풀 모두 복사됨
    Archived { local: PathBuf, data_pool: PathBuf },
    /// 데이터 풀을 찾지 못해 로컬에만 복사됨
    PartiallyArchived { local: PathBuf },
    /// 쓰기/복사 중 실패
    Failed { reason: String },
}

/// 태스크 감사 기록 작성기
pub struct TaskLogger {
    host: HostServices,
    config: AosConfig,
    channel: OutputChannel,
}

impl TaskLogger {
    pub fn new(host: HostServices, config: AosConfig, channel: OutputChannel) -> Self {
        Self {
            host,
            config,
            channel,
        }
    }

    pub fn channel(&self) -> &OutputChannel {
        &self.channel
    }

    /// `task.completed` 처리
    ///
    /// 설정 생성 실패는 `Err`로, 쓰기/복사 실패는 `TaskLogOutcome::Failed`로 돌려준다.
    pub async fn handle_completed(
        &self,
        task_id: &str,
        usage: Option<&TokenUsage>,
    ) -> Result<TaskLogOutcome> {
        if let Some(usage) = usage {
            debug!(
                task_id,
                tokens_in = usage.total_tokens_in,
                tokens_out = usage.total_tokens_out,
                cost = usage.total_cost,
                "Task completed"
            );
        }

        let task_config = generate_task_config(&self.host).await?;

        match self.archive(task_id, &task_config).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(task_id, error = %e, "Task log failed");
                self.channel
                    .append_line(format!("Error saving task configuration: {}", e));
                self.host
                    .notifier
                    .show_error(&format!("Failed to save task configuration: {}", e));
                Ok(TaskLogOutcome::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn archive(
        &self,
        task_id: &str,
        task_config: &crate::task_config::TaskConfig,
    ) -> Result<TaskLogOutcome> {
        let task = self.host.session.task_with_id(task_id).await?;
        let task_dir = task.task_dir_path.as_path();

        self.write_snapshots(task_dir).await?;

        let system_prompt_path = task_dir.join(SYSTEM_PROMPT_FILE);
        let api_provider_path = task_dir.join(API_PROVIDER_FILE);
        write_json_pretty(&system_prompt_path, &task_config.system_prompt).await?;
        write_json_pretty(&api_provider_path, &task_config.api_provider).await?;
        self.channel.append_line(format!(
            "Task configuration saved to {},{}",
            system_prompt_path.display(),
            api_provider_path.display()
        ));

        let cwd = self.host.session.cwd();
        let local = self.config.local_archive_path(&cwd, task_id);
        self.copy_task_dir(task_dir, &local).await?;

        let Some(data_pool) = locate_folder(&cwd, &self.config.data_pool_dir_name).await else {
            let message = format!(
                "Folder \"{}\" not found any where in parent of workspace: {}",
                self.config.data_pool_dir_name,
                cwd.display()
            );
            warn!(task_id, "{}", message);
            self.channel.append_line(message.as_str());
            self.host.notifier.show_error(&message);
            return Ok(TaskLogOutcome::PartiallyArchived { local });
        };

        let pool_entry = self.config.data_pool_archive_path(&data_pool, task_id);
        self.copy_task_dir(task_dir, &pool_entry).await?;

        info!(task_id, local = %local.display(), data_pool = %pool_entry.display(), "Task archived");
        Ok(TaskLogOutcome::Archived {
            local,
            data_pool: pool_entry,
        })
    }

    async fn write_snapshots(&self, task_dir: &Path) -> Result<()> {
        export_settings(&self.host, &task_dir.join(SETTINGS_SNAPSHOT_FILE)).await?;
        write_env_vars(&task_dir.join(ENV_VARS_FILE)).await?;
        gather_host_info_and_write(&task_dir.join(HOST_FILE)).await?;
        let folders = self.host.session.workspace_folders();
        log_workspace_folders(folders.as_deref(), &task_dir.join(WORKSPACE_FILE)).await
    }

    async fn copy_task_dir(&self, task_dir: &Path, dest: &Path) -> Result<()> {
        copy_dir(task_dir, dest, self.config.archive_recursive).await?;
        self.channel
            .append_line(format!("Task directory copied to {}", dest.display()));
        Ok(())
    }
}

// ============================================================================
// TaskLogListener
// ============================================================================

/// 이벤트 버스의 `task.*` 이벤트를 TaskLogger로 연결
pub struct TaskLogListener {
    logger: Arc<TaskLogger>,
}

impl TaskLogListener {
    pub fn new(logger: Arc<TaskLogger>) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl EventListener for TaskLogListener {
    fn name(&self) -> &str {
        "task-log"
    }

    fn categories(&self) -> Option<Vec<EventCategory>> {
        Some(vec![EventCategory::Task])
    }

    async fn on_event(&self, event: &AosEvent) {
        let Some(task_id) = event.task_id.as_deref() else {
            warn!(event_type = %event.event_type, "Task event without task id");
            return;
        };

        match event.event_type.as_str() {
            TASK_STARTED => {
                self.logger
                    .channel
                    .append_line(format!("Task started: {}", task_id));
            }
            TASK_COMPLETED => {
                let usage = event.token_usage();
                match self.logger.handle_completed(task_id, usage.as_ref()).await {
                    Ok(TaskLogOutcome::Archived { .. }) => {
                        info!(task_id, "Task log archived");
                    }
                    Ok(TaskLogOutcome::PartiallyArchived { local }) => {
                        warn!(task_id, local = %local.display(), "Task log archived locally only");
                    }
                    Ok(TaskLogOutcome::Failed { reason }) => {
                        warn!(task_id, %reason, "Task log failed");
                    }
                    Err(e) => {
                        let message = format!("Error generating task configuration: {}", e);
                        error!(task_id, error = %e, "Task config generation failed");
                        self.logger.channel.append_line(message.as_str());
                        self.logger.host.notifier.show_error(&message);
                    }
                }
            }
            TASK_ABORTED | TASK_DELETED => {
                debug!(task_id, event_type = %event.event_type, "Task event ignored");
            }
            other => {
                debug!(task_id, event_type = other, "Unknown task event");
            }
        }
    }
}
