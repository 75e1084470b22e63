//! Settings export/import
//!
//! 번들 형식: `{ "providerProfiles": ..., "globalSettings": ... }`.
//! 내부 스키마는 각 매니저 소유.

use aos_foundation::{write_json_pretty, Result};
use aos_host::{HostServices, ModeConfig, ProviderProfiles};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// export/import 번들
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsBundle {
    pub provider_profiles: ProviderProfiles,
    pub global_settings: Value,
}

impl SettingsBundle {
    /// `globalSettings.customModes` 항목 (형식이 맞지 않는 항목은 건너뜀)
    fn custom_modes(&self) -> Vec<ModeConfig> {
        let Some(modes) = self.global_settings.get("customModes").and_then(Value::as_array) else {
            return Vec::new();
        };
        modes
            .iter()
            .filter_map(|mode| match serde_json::from_value::<ModeConfig>(mode.clone()) {
                Ok(mode) => Some(mode),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed custom mode");
                    None
                }
            })
            .collect()
    }
}

/// 호스트 설정을 번들로 내보내기
///
/// 부모 디렉토리를 만들고 pretty JSON(UTF-8)으로 덮어쓴다.
pub async fn export_settings(host: &HostServices, path: &Path) -> Result<()> {
    let provider_profiles = host.provider_settings.export().await?;
    let global_settings = host.global_settings.export().await?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let bundle = serde_json::json!({
        "providerProfiles": provider_profiles,
        "globalSettings": global_settings,
    });
    write_json_pretty(path, &bundle).await?;
    debug!(path = %path.display(), "Settings exported");
    Ok(())
}

/// 번들을 읽어 호스트 설정에 적용
///
/// 파일이 없거나 읽을 수 없거나 번들 형식이 아니면 `Ok(false)`.
pub async fn import_settings(host: &HostServices, path: &Path) -> Result<bool> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Settings file unreadable");
            return Ok(false);
        }
    };

    let bundle: SettingsBundle = match serde_json::from_str(&content) {
        Ok(bundle) => bundle,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Settings file is not a valid bundle");
            return Ok(false);
        }
    };

    for mode in bundle.custom_modes() {
        let slug = mode.slug.clone();
        host.custom_modes.update_custom_mode(&slug, mode).await?;
    }

    let existing: ProviderProfiles =
        serde_json::from_value(host.provider_settings.export().await?).unwrap_or_default();
    let merged = existing.merged_with(bundle.provider_profiles);
    host.provider_settings
        .import(serde_json::to_value(merged)?)
        .await?;

    host.global_settings.import(bundle.global_settings).await?;

    debug!(path = %path.display(), "Settings imported");
    Ok(true)
}
