//! # aos-tasklog
//!
//! 호스트 태스크 감사 기록 레이어
//!
//! - `snapshot`: 환경변수, 머신 정보, 워크스페이스 폴더 스냅샷
//! - `import_export`: `{ providerProfiles, globalSettings }` 번들
//! - `task_config`: 시스템 프롬프트 + provider/model
//! - `logger`: `task.completed` → 태스크 디렉토리 기록 및 아카이브
//! - `watch`: 프롬프트 파일 / 외부 설정 파일 감시
//! - `markdown`: 대화 기록 Markdown 내보내기
//! - `activate`: 위 구성요소를 호스트 하나에 연결
//!
//! ## 사용 예
//!
//! ```ignore
//! let bus = Arc::new(EventBus::new());
//! let ext = AosExtension::activate(services, AosConfig::load(&root)?, bus.clone()).await?;
//! bus.publish(task::completed("task-1", &usage)).await;
//! ```

pub mod activate;
pub mod import_export;
pub mod logger;
pub mod markdown;
pub mod snapshot;
pub mod task_config;
pub mod watch;

pub use activate::AosExtension;
pub use import_export::{export_settings, import_settings, SettingsBundle};
pub use logger::{
    TaskLogListener, TaskLogOutcome, TaskLogger, API_PROVIDER_FILE, ENV_VARS_FILE, HOST_FILE,
    SETTINGS_SNAPSHOT_FILE, SYSTEM_PROMPT_FILE, WORKSPACE_FILE,
};
pub use markdown::{export_task, load_history, task_file_name, task_to_markdown, HistoryMessage};
pub use snapshot::{
    gather_host_info_and_write, log_workspace_folders, write_env_vars, HostInfo, HostSnapshot,
};
pub use task_config::{generate_task_config, ApiProviderInfo, TaskConfig};
pub use watch::{
    import_host_settings, remove_allowed_command, PromptKind, PromptMonitor, SettingsWatcher,
    WatchHandle,
};
