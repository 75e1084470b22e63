//! Task config generator
//!
//! 현재 세션 기준 시스템 프롬프트와 provider/model을 만든다.
//! 결과는 호출자에게만 돌려준다 (프로세스 전역 보관 없음).

use aos_foundation::{Error, Result};
use aos_host::{
    get_mode_by_slug, HostServices, SystemPromptRequest, ToolGroup, DEFAULT_BROWSER_VIEWPORT,
    DEFAULT_FUZZY_MATCH_THRESHOLD, DEFAULT_MODE_SLUG,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// `api_provider.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiProviderInfo {
    pub name: String,
    pub model: String,
}

/// 태스크 설정 스냅샷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    pub system_prompt: Option<String>,
    pub api_provider: ApiProviderInfo,
}

/// 현재 세션 상태로 TaskConfig 생성
///
/// 활성 API 설정 프로필의 provider를 찾지 못하면 `Error::ConfigMissing`.
pub async fn generate_task_config(host: &HostServices) -> Result<TaskConfig> {
    let state = host.session.state().await?;
    let custom_modes = host.custom_modes.custom_modes().await?;

    let mode_slug = state
        .mode
        .clone()
        .unwrap_or_else(|| DEFAULT_MODE_SLUG.to_string());
    // 찾을 수 없는 모드(삭제된 커스텀 모드 등)는 브라우저 그룹이 없는 것으로 본다
    let mode_supports_browser = get_mode_by_slug(&mode_slug, &custom_modes)
        .map_or(false, |mode| mode.has_group(ToolGroup::Browser));

    // 모델 정보만 필요하므로 핸들러는 바로 버린다
    let model = host.api.build(&state.api_configuration)?.model();

    let can_use_browser_tool = model.supports_computer_use
        && mode_supports_browser
        && state.browser_tool_enabled.unwrap_or(true);

    let provider_name = state
        .current_api_provider()
        .ok_or_else(|| {
            Error::ConfigMissing(format!(
                "no API provider for configuration '{}'",
                state.current_api_config_name.as_deref().unwrap_or("")
            ))
        })?
        .to_string();

    debug!(
        mode = %mode_slug,
        provider = %provider_name,
        model = %model.id,
        can_use_browser_tool,
        "Generating task config"
    );

    let request = SystemPromptRequest {
        cwd: host.session.cwd(),
        supports_computer_use: can_use_browser_tool,
        mcp_enabled: state.mcp_enabled.unwrap_or(true),
        fuzzy_match_threshold: state
            .fuzzy_match_threshold
            .unwrap_or(DEFAULT_FUZZY_MATCH_THRESHOLD),
        browser_viewport_size: state
            .browser_viewport_size
            .clone()
            .unwrap_or_else(|| DEFAULT_BROWSER_VIEWPORT.to_string()),
        mode: Some(mode_slug),
        custom_mode_prompts: state.custom_mode_prompts,
        custom_modes,
        custom_instructions: state.custom_instructions,
        diff_enabled: state.diff_enabled.unwrap_or(true),
        experiments: state.experiments,
        enable_mcp_server_creation: state.enable_mcp_server_creation.unwrap_or(true),
        language: state.language,
        ignore_instructions: None,
    };

    let system_prompt = host.prompts.render(&request).await?;

    Ok(TaskConfig {
        system_prompt: Some(system_prompt),
        api_provider: ApiProviderInfo {
            name: provider_name,
            model: model.id,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aos_host::{
        ApiConfiguration, ApiHandler, ApiHandlerFactory, GlobalSettingsManager, LocalHost,
        ModelInfo, PromptRenderer, ProviderSettingsManager, RecordingNotifier, StaticApiHandler,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// 마지막 렌더 요청을 기록
    #[derive(Default)]
    struct CapturedRequest(Mutex<Option<SystemPromptRequest>>);

    #[async_trait]
    impl PromptRenderer for CapturedRequest {
        async fn render(&self, request: &SystemPromptRequest) -> Result<String> {
            *self.0.lock().unwrap() = Some(request.clone());
            Ok(format!("prompt for {}", request.mode.as_deref().unwrap_or("?")))
        }
    }

    struct FixedModel(ModelInfo);

    impl ApiHandlerFactory for FixedModel {
        fn build(&self, _: &ApiConfiguration) -> Result<Box<dyn ApiHandler>> {
            Ok(Box::new(StaticApiHandler::new(self.0.clone())))
        }
    }

    async fn seeded_host(temp: &TempDir, global: serde_json::Value) -> Arc<LocalHost> {
        let host = Arc::new(LocalHost::new(temp.path()));
        ProviderSettingsManager::import(
            host.as_ref(),
            json!({
                "currentApiConfigName": "work",
                "apiConfigs": {
                    "work": { "id": "w", "apiProvider": "anthropic", "apiModelId": "claude-sonnet-4-20250514" }
                }
            }),
        )
        .await
        .unwrap();
        GlobalSettingsManager::import(host.as_ref(), global).await.unwrap();
        host
    }

    #[tokio::test]
    async fn test_generate_with_local_host() {
        let temp = TempDir::new().unwrap();
        let host = seeded_host(&temp, json!({})).await;
        let services = HostServices::local(host, Arc::new(RecordingNotifier::new()));

        let config = generate_task_config(&services).await.unwrap();
        assert_eq!(config.api_provider.name, "anthropic");
        assert_eq!(config.api_provider.model, "claude-sonnet-4-20250514");
        assert!(config.system_prompt.unwrap().contains("Puppeteer"));
    }

    #[tokio::test]
    async fn test_browser_disabled_by_mode_or_setting() {
        let temp = TempDir::new().unwrap();
        let host = seeded_host(&temp, json!({ "mode": "orchestrator" })).await;
        let renderer = Arc::new(CapturedRequest::default());
        let mut services = HostServices::local(host.clone(), Arc::new(RecordingNotifier::new()));
        services.prompts = renderer.clone();
        services.api = Arc::new(FixedModel(ModelInfo::new("m").with_computer_use()));

        generate_task_config(&services).await.unwrap();
        let request = renderer.0.lock().unwrap().clone().unwrap();
        assert!(!request.supports_computer_use);
        assert_eq!(request.browser_viewport_size, "900x600");
        assert_eq!(request.fuzzy_match_threshold, 1.0);
        assert!(request.ignore_instructions.is_none());

        GlobalSettingsManager::import(
            host.as_ref(),
            json!({ "mode": "code", "browserToolEnabled": false }),
        )
        .await
        .unwrap();
        generate_task_config(&services).await.unwrap();
        let request = renderer.0.lock().unwrap().clone().unwrap();
        assert!(!request.supports_computer_use);
        assert_eq!(request.mode.as_deref(), Some("code"));
    }

    #[tokio::test]
    async fn test_unknown_mode_has_no_browser() {
        let temp = TempDir::new().unwrap();
        let host = seeded_host(&temp, json!({ "mode": "deleted-custom-mode" })).await;
        let renderer = Arc::new(CapturedRequest::default());
        let mut services = HostServices::local(host, Arc::new(RecordingNotifier::new()));
        services.prompts = renderer.clone();
        services.api = Arc::new(FixedModel(ModelInfo::new("m").with_computer_use()));

        generate_task_config(&services).await.unwrap();
        let request = renderer.0.lock().unwrap().clone().unwrap();
        // code 모드로 대체하지 않음
        assert!(!request.supports_computer_use);
        assert_eq!(request.mode.as_deref(), Some("deleted-custom-mode"));
    }

    #[tokio::test]
    async fn test_missing_provider_is_config_missing() {
        let temp = TempDir::new().unwrap();
        let host = Arc::new(LocalHost::new(temp.path()));
        let services = HostServices::local(host, Arc::new(RecordingNotifier::new()));

        let err = generate_task_config(&services).await.unwrap_err();
        assert!(matches!(err, Error::ConfigMissing(_)));
    }
}
