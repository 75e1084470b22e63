//! # aos-host
//!
//! AOS 호스트 서비스 경계
//!
//! 태스크 엔진, 세션 상태, 설정 저장소, 프롬프트 생성은 호스트(코드 어시스턴트)가
//! 소유한다. 이 크레이트는 그것들을 trait으로 기술한다.
//!
//! ## 모듈
//! - `session`: session state snapshot, task handles, workspace folders
//! - `mode`: modes and tool groups
//! - `model`: API handler factory and model info
//! - `prompt`: system prompt requests and rendering
//! - `settings`: provider/global/custom-mode managers
//! - `services`: `SessionHost`, `UserNotifier`, `HostServices`
//! - `local`: file-backed `LocalHost` for the CLI and tests

pub mod local;
pub mod mode;
pub mod model;
pub mod prompt;
pub mod services;
pub mod session;
pub mod settings;

// Session
pub use session::{ApiConfigMeta, ApiConfiguration, SessionState, TaskHandle, WorkspaceFolder};

// Modes and models
pub use mode::{
    builtin_modes, get_mode_by_slug, GroupEntry, GroupOptions, ModeConfig, ToolGroup,
    DEFAULT_MODE_SLUG,
};
pub use model::{
    lookup_model, ApiHandler, ApiHandlerFactory, ModelInfo, RegistryApiHandlerFactory,
    StaticApiHandler,
};

// Prompt
pub use prompt::{
    PromptRenderer, SystemPromptRequest, TemplatePromptRenderer, DEFAULT_BROWSER_VIEWPORT,
    DEFAULT_FUZZY_MATCH_THRESHOLD,
};

// Settings and services
pub use services::{HostServices, SessionHost, TracingNotifier, UserNotifier};
pub use settings::{
    CustomModesManager, GlobalSettingsManager, ProviderProfiles, ProviderSettingsManager,
};

// Local host
pub use local::{LocalHost, Notice, NoticeLevel, RecordingNotifier};
