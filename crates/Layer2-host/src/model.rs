//! API Handler - 모델 정보 조회
//!
//! 태스크 설정 생성기는 현재 API 설정으로 핸들러를 만들어
//! 모델이 무엇을 지원하는지만 묻고 바로 버린다.

use crate::session::ApiConfiguration;
use aos_foundation::Result;
use serde::{Deserialize, Serialize};

/// 모델 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// 모델 ID (예: "claude-sonnet-4-20250514")
    pub id: String,

    /// 브라우저 조작(computer use) 지원 여부
    #[serde(default)]
    pub supports_computer_use: bool,

    /// 컨텍스트 윈도우 크기 (토큰)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u32>,

    /// 최대 출력 토큰
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ModelInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            supports_computer_use: false,
            context_window: None,
            max_tokens: None,
        }
    }

    pub fn with_computer_use(mut self) -> Self {
        self.supports_computer_use = true;
        self
    }

    pub fn with_limits(mut self, context_window: u32, max_tokens: u32) -> Self {
        self.context_window = Some(context_window);
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// API 설정으로 만든 핸들러
pub trait ApiHandler: Send + Sync {
    fn model(&self) -> ModelInfo;
}

/// API 핸들러 팩토리 (호스트 서비스)
pub trait ApiHandlerFactory: Send + Sync {
    fn build(&self, configuration: &ApiConfiguration) -> Result<Box<dyn ApiHandler>>;
}

// ============================================================================
// Static registry implementation
// ============================================================================

/// 고정된 모델 정보만 돌려주는 핸들러
#[derive(Debug, Clone)]
pub struct StaticApiHandler {
    info: ModelInfo,
}

impl StaticApiHandler {
    pub fn new(info: ModelInfo) -> Self {
        Self { info }
    }
}

impl ApiHandler for StaticApiHandler {
    fn model(&self) -> ModelInfo {
        self.info.clone()
    }
}

/// computer use를 지원하는 모델 ID 접두사
const COMPUTER_USE_MODELS: &[&str] = &[
    "claude-3-5-sonnet",
    "claude-3-7-sonnet",
    "claude-sonnet-4",
    "claude-opus-4",
];

/// 설정에 모델이 없을 때 provider별 기본 모델
fn default_model_for(provider: Option<&str>) -> &'static str {
    match provider {
        Some("anthropic") | Some("bedrock") | Some("vertex") => "claude-sonnet-4-20250514",
        Some("openai") | Some("openai-native") => "gpt-4.1",
        Some("gemini") => "gemini-2.5-pro",
        Some("openrouter") => "anthropic/claude-sonnet-4",
        _ => "claude-sonnet-4-20250514",
    }
}

/// 모델 ID로 모델 정보 조회
///
/// provider가 붙은 ID(`anthropic/claude-3.7-sonnet`)는 마지막 `/` 뒤 부분으로,
/// 점은 대시로 바꿔서 비교한다.
pub fn lookup_model(model_id: &str) -> ModelInfo {
    let bare = model_id.rsplit('/').next().unwrap_or(model_id).replace('.', "-");
    let mut info = ModelInfo::new(model_id);
    if COMPUTER_USE_MODELS.iter().any(|prefix| bare.starts_with(prefix)) {
        info = info.with_computer_use().with_limits(200_000, 8192);
    }
    info
}

/// 내장 모델 테이블 기반 팩토리
#[derive(Debug, Clone, Default)]
pub struct RegistryApiHandlerFactory;

impl ApiHandlerFactory for RegistryApiHandlerFactory {
    fn build(&self, configuration: &ApiConfiguration) -> Result<Box<dyn ApiHandler>> {
        let model_id = configuration
            .model_id()
            .unwrap_or_else(|| default_model_for(configuration.api_provider.as_deref()).to_string());
        Ok(Box::new(StaticApiHandler::new(lookup_model(&model_id))))
    }
}
