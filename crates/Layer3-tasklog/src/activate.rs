//! Activation - 호스트 하나에 대해 채널, 리스너, 감시기를 연결

use crate::logger::{TaskLogListener, TaskLogger};
use crate::task_config::{generate_task_config, TaskConfig};
use crate::watch::{PromptMonitor, SettingsWatcher, WatchHandle};
use aos_foundation::{AosConfig, EventBus, ListenerId, OutputChannel, Result};
use aos_host::HostServices;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// 활성화된 애드온
pub struct AosExtension {
    host: HostServices,
    config: AosConfig,
    channel: OutputChannel,
    bus: Arc<EventBus>,
    logger: Arc<TaskLogger>,
    prompts: Option<Arc<PromptMonitor>>,
    listeners: Vec<ListenerId>,
    watchers: Vec<WatchHandle>,
}

impl AosExtension {
    /// 리스너를 버스에 등록하고 설정에 따라 감시기를 시작한다
    ///
    /// 감시기 시작 실패는 경고만 남긴다.
    pub async fn activate(host: HostServices, config: AosConfig, bus: Arc<EventBus>) -> Result<Self> {
        let channel = OutputChannel::new(&config.channel_name);
        let logger = Arc::new(TaskLogger::new(host.clone(), config.clone(), channel.clone()));

        let mut listeners = vec![
            bus.subscribe(Arc::new(TaskLogListener::new(logger.clone())))
                .await,
        ];
        let mut watchers = Vec::new();

        let mut prompts = None;
        if config.watch_prompts {
            let monitor = Arc::new(PromptMonitor::new(&config, channel.clone(), host.notifier.clone())?);
            let roots: Vec<PathBuf> = host
                .session
                .workspace_folders()
                .unwrap_or_default()
                .into_iter()
                .map(|folder| folder.path)
                .collect();
            match monitor.start(&roots).await {
                Ok(handle) => watchers.push(handle),
                Err(e) => warn!(error = %e, "Prompt watcher disabled"),
            }
            listeners.push(bus.subscribe(monitor.clone()).await);
            prompts = Some(monitor);
        }

        if config.watch_settings {
            let watcher = SettingsWatcher::new(host.clone(), channel.clone(), &config.settings_file)
                .with_bus(bus.clone());
            match watcher.start().await {
                Ok(handle) => watchers.push(handle),
                Err(e) => warn!(error = %e, "Settings watcher disabled"),
            }
        }

        info!(
            channel = %channel.name(),
            watchers = watchers.len(),
            listeners = listeners.len(),
            "AOS activated"
        );

        Ok(Self {
            host,
            config,
            channel,
            bus,
            logger,
            prompts,
            listeners,
            watchers,
        })
    }

    pub fn host(&self) -> &HostServices {
        &self.host
    }

    pub fn config(&self) -> &AosConfig {
        &self.config
    }

    pub fn channel(&self) -> &OutputChannel {
        &self.channel
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn logger(&self) -> &Arc<TaskLogger> {
        &self.logger
    }

    pub fn watchers(&self) -> &[WatchHandle] {
        &self.watchers
    }

    /// 디버그 명령: 새 설정을 생성해 시스템 프롬프트를 채널에 남긴다
    pub async fn debug_system_prompt(&self) -> Result<TaskConfig> {
        let config = generate_task_config(&self.host).await?;
        self.channel.append_line(format!(
            "System Prompt: {}",
            config.system_prompt.as_deref().unwrap_or_default()
        ));
        Ok(config)
    }

    /// 리스너 해제, 감시 중지
    pub async fn shutdown(self) {
        for id in &self.listeners {
            self.bus.unsubscribe(*id).await;
        }
        if let Some(monitor) = &self.prompts {
            monitor.shutdown();
        }
        let stopped = self.watchers.len();
        for handle in self.watchers {
            handle.stop();
        }
        info!(watchers = stopped, "AOS deactivated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aos_foundation::event::task;
    use aos_host::{LocalHost, ProviderSettingsManager, RecordingNotifier};
    use serde_json::json;
    use tempfile::TempDir;

    async fn seeded(temp: &TempDir) -> HostServices {
        let host = Arc::new(LocalHost::new(temp.path()));
        ProviderSettingsManager::import(
            host.as_ref(),
            json!({
                "currentApiConfigName": "default",
                "apiConfigs": { "default": { "id": "d", "apiProvider": "openai", "apiModelId": "gpt-4.1" } }
            }),
        )
        .await
        .unwrap();
        HostServices::local(host, Arc::new(RecordingNotifier::new()))
    }

    fn quiet_config() -> AosConfig {
        AosConfig::default().watch_prompts(false).watch_settings(false)
    }

    #[tokio::test]
    async fn test_debug_system_prompt() {
        let temp = TempDir::new().unwrap();
        let ext = AosExtension::activate(seeded(&temp).await, quiet_config(), Arc::new(EventBus::new()))
            .await
            .unwrap();

        let config = ext.debug_system_prompt().await.unwrap();
        assert_eq!(config.api_provider.name, "openai");
        assert_eq!(config.api_provider.model, "gpt-4.1");
        assert!(ext.channel().lines()[0].starts_with("System Prompt: You are Roo"));
        assert_eq!(ext.channel().name(), "Agent-Operating-System");
    }

    #[tokio::test]
    async fn test_shutdown_unsubscribes() {
        let temp = TempDir::new().unwrap();
        let bus = Arc::new(EventBus::new());
        let ext = AosExtension::activate(seeded(&temp).await, quiet_config(), bus.clone())
            .await
            .unwrap();
        assert_eq!(bus.listener_count().await, 1);

        let channel = ext.channel().clone();
        ext.shutdown().await;
        assert_eq!(bus.listener_count().await, 0);

        bus.publish(task::started("after")).await;
        assert!(channel.lines().is_empty());
    }

    #[tokio::test]
    async fn test_activate_with_watchers() {
        let temp = TempDir::new().unwrap();
        let settings = temp.path().join("missing-settings.json");
        let config = AosConfig::default().settings_file(&settings);
        let bus = Arc::new(EventBus::new());

        let ext = AosExtension::activate(seeded(&temp).await, config, bus.clone())
            .await
            .unwrap();
        assert_eq!(ext.watchers().len(), 2);
        assert_eq!(bus.listener_count().await, 2);
        assert!(ext
            .channel()
            .contains("Warning: rooSettings.json file not found at"));
        ext.shutdown().await;
    }
}
