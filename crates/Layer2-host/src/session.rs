//! Session types - 호스트 세션 상태 스냅샷
//!
//! 호스트의 `getState()`에 해당하는 값들. 직렬화 키는 호스트 설정 파일과 같은 camelCase.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// 활성 API 설정 (provider별 키는 `extra`에 그대로 보관)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_model_id: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ApiConfiguration {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            api_provider: Some(provider.into()),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.api_model_id = Some(model_id.into());
        self
    }

    /// 설정된 모델 ID
    ///
    /// `apiModelId`가 없으면 provider별 키(`openRouterModelId`, `ollamaModelId` ...)를 찾는다.
    pub fn model_id(&self) -> Option<String> {
        if let Some(id) = self.api_model_id.as_ref().filter(|id| !id.is_empty()) {
            return Some(id.clone());
        }
        self.extra
            .iter()
            .filter(|(key, _)| key.ends_with("ModelId"))
            .find_map(|(_, value)| value.as_str().filter(|s| !s.is_empty()))
            .map(str::to_string)
    }
}

/// 저장된 API 설정 프로필의 메타데이터
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfigMeta {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_provider: Option<String>,
}

/// 호스트 세션 상태
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    pub api_configuration: ApiConfiguration,
    pub current_api_config_name: Option<String>,
    pub list_api_config_meta: Vec<ApiConfigMeta>,

    /// 모드별 프롬프트 오버라이드 (스키마는 호스트 소유)
    pub custom_mode_prompts: BTreeMap<String, Value>,
    pub custom_instructions: Option<String>,
    pub browser_viewport_size: Option<String>,
    pub diff_enabled: Option<bool>,
    pub mcp_enabled: Option<bool>,
    pub fuzzy_match_threshold: Option<f64>,
    pub experiments: BTreeMap<String, bool>,
    pub enable_mcp_server_creation: Option<bool>,
    pub browser_tool_enabled: Option<bool>,
    pub language: Option<String>,
    pub mode: Option<String>,
    pub allowed_commands: Vec<String>,
}

impl SessionState {
    /// `currentApiConfigName`에 해당하는 프로필의 provider 이름
    pub fn current_api_provider(&self) -> Option<&str> {
        let current = self.current_api_config_name.as_deref()?;
        self.list_api_config_meta
            .iter()
            .find(|meta| meta.name == current)
            .and_then(|meta| meta.api_provider.as_deref())
    }
}

/// 호스트가 관리하는 태스크 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHandle {
    pub task_id: String,
    /// 태스크 저장 디렉토리 (호스트 소유, 이미 존재함)
    pub task_dir_path: PathBuf,
}

/// 열려 있는 워크스페이스 루트 폴더
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceFolder {
    pub name: String,
    pub path: PathBuf,
    pub index: usize,
}

impl WorkspaceFolder {
    /// 경로의 마지막 구성요소를 이름으로 사용
    pub fn from_path(path: impl Into<PathBuf>, index: usize) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path, index }
    }
}
