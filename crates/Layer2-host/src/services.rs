//! Host services - 애드온이 호출하는 호스트 기능 묶음
//!
//! 호스트 엔진/세션/웹뷰는 불투명하다. 애드온은 아래 trait만 통해 접근한다.

use crate::model::ApiHandlerFactory;
use crate::prompt::PromptRenderer;
use crate::session::{SessionState, TaskHandle, WorkspaceFolder};
use crate::settings::{CustomModesManager, GlobalSettingsManager, ProviderSettingsManager};
use aos_foundation::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

/// 호스트 세션 (provider/웹뷰 측)
#[async_trait]
pub trait SessionHost: Send + Sync {
    /// 워크스페이스 루트 (첫 번째 폴더)
    fn cwd(&self) -> PathBuf;

    /// 열린 워크스페이스 폴더 (없으면 `None`)
    fn workspace_folders(&self) -> Option<Vec<WorkspaceFolder>>;

    async fn state(&self) -> Result<SessionState>;

    /// taskId로 태스크 조회. 없으면 `Error::TaskNotFound`
    async fn task_with_id(&self, task_id: &str) -> Result<TaskHandle>;

    async fn post_state_to_webview(&self) -> Result<()>;

    /// 외부 설정 import 시각 기록
    async fn mark_settings_imported(&self, at: DateTime<Utc>) -> Result<()>;

    async fn allowed_commands(&self) -> Result<Vec<String>>;

    async fn set_allowed_commands(&self, commands: Vec<String>) -> Result<()>;
}

/// 사용자 알림 (information / warning / error 메시지)
pub trait UserNotifier: Send + Sync {
    fn show_info(&self, message: &str);
    fn show_warning(&self, message: &str);
    fn show_error(&self, message: &str);
}

/// 애드온이 쓰는 호스트 서비스 핸들 묶음
#[derive(Clone)]
pub struct HostServices {
    pub session: Arc<dyn SessionHost>,
    pub prompts: Arc<dyn PromptRenderer>,
    pub api: Arc<dyn ApiHandlerFactory>,
    pub provider_settings: Arc<dyn ProviderSettingsManager>,
    pub global_settings: Arc<dyn GlobalSettingsManager>,
    pub custom_modes: Arc<dyn CustomModesManager>,
    pub notifier: Arc<dyn UserNotifier>,
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices")
            .field("cwd", &self.session.cwd())
            .finish_non_exhaustive()
    }
}

/// 알림을 tracing으로만 남기는 notifier (헤드리스 실행용)
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl UserNotifier for TracingNotifier {
    fn show_info(&self, message: &str) {
        tracing::info!(target: "aos::notify", "{}", message);
    }

    fn show_warning(&self, message: &str) {
        tracing::warn!(target: "aos::notify", "{}", message);
    }

    fn show_error(&self, message: &str) {
        tracing::error!(target: "aos::notify", "{}", message);
    }
}
