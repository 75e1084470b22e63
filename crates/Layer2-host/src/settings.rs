//! Settings managers - 호스트가 소유한 설정 저장소에 대한 seam
//!
//! 스키마는 호스트 소유. 이 crate는 import 병합에 필요한 필드만 타입으로 본다.

use crate::mode::ModeConfig;
use aos_foundation::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// API provider 프로필 관리자
#[async_trait]
pub trait ProviderSettingsManager: Send + Sync {
    async fn export(&self) -> Result<Value>;
    async fn import(&self, profiles: Value) -> Result<()>;
}

/// 글로벌 설정 관리자
#[async_trait]
pub trait GlobalSettingsManager: Send + Sync {
    async fn export(&self) -> Result<Value>;
    async fn import(&self, settings: Value) -> Result<()>;
}

/// 커스텀 모드 관리자
#[async_trait]
pub trait CustomModesManager: Send + Sync {
    async fn custom_modes(&self) -> Result<Vec<ModeConfig>>;
    async fn update_custom_mode(&self, slug: &str, mode: ModeConfig) -> Result<()>;
}

// ============================================================================
// ProviderProfiles
// ============================================================================

/// provider 프로필 번들
///
/// `apiConfigs` 값과 나머지 키는 해석하지 않고 보존한다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfiles {
    #[serde(default)]
    pub current_api_config_name: String,

    #[serde(default)]
    pub api_configs: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_api_configs: Option<BTreeMap<String, String>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ProviderProfiles {
    /// import된 프로필을 기존 프로필 위에 병합
    ///
    /// `apiConfigs`는 키 단위로 합치고(import 우선), 현재 프로필 이름은 import 값을 쓴다.
    /// `modeApiConfigs`도 키 단위로 합친다.
    pub fn merged_with(mut self, imported: ProviderProfiles) -> Self {
        self.api_configs.extend(imported.api_configs);
        self.current_api_config_name = imported.current_api_config_name;
        if let Some(modes) = imported.mode_api_configs {
            self.mode_api_configs.get_or_insert_with(BTreeMap::new).extend(modes);
        }
        self.extra.extend(imported.extra);
        self
    }

    /// 프로필 이름 → `apiProvider` 값
    pub fn provider_of(&self, name: &str) -> Option<&str> {
        self.api_configs
            .get(name)
            .and_then(|config| config.get("apiProvider"))
            .and_then(Value::as_str)
    }
}
