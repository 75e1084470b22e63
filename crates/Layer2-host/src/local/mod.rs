//! Local host - 에디터 없이 파이프라인을 돌리기 위한 파일 기반 호스트

mod host;
mod notifier;

pub use host::{
    LocalHost, CUSTOM_MODES_FILE, GLOBAL_SETTINGS_FILE, HOST_DIR, PROVIDER_PROFILES_FILE,
    TASKS_DIR,
};
pub use notifier::{Notice, NoticeLevel, RecordingNotifier};

use crate::model::RegistryApiHandlerFactory;
use crate::prompt::TemplatePromptRenderer;
use crate::services::{HostServices, UserNotifier};
use std::sync::Arc;

impl HostServices {
    /// LocalHost 하나로 모든 서비스 구성
    pub fn local(host: Arc<LocalHost>, notifier: Arc<dyn UserNotifier>) -> Self {
        Self {
            session: host.clone(),
            prompts: Arc::new(TemplatePromptRenderer),
            api: Arc::new(RegistryApiHandlerFactory),
            provider_settings: host.clone(),
            global_settings: host.clone(),
            custom_modes: host,
            notifier,
        }
    }
}
