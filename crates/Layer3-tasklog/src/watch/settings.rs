//! Settings Watcher - 외부 설정 파일 감시 및 허용 명령 관리

use super::{event_watcher, watch_path, WatchHandle};
use crate::import_export::import_settings;
use aos_foundation::event::system;
use aos_foundation::{Error, EventBus, OutputChannel, Result};
use aos_host::HostServices;
use chrono::Utc;
use notify::{EventKind, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 연속된 수정 이벤트를 하나로 묶는 대기 시간
const SETTINGS_DEBOUNCE_MS: u64 = 200;

/// 외부 설정 파일을 호스트에 적용
///
/// 성공하면 import 시각을 기록하고 웹뷰를 갱신한다. 실패는 경고로만 남기고 `false`.
pub async fn import_host_settings(host: &HostServices, channel: &OutputChannel, path: &Path) -> bool {
    let result = import_settings(host, path).await;
    match result {
        Ok(true) => {
            if let Err(e) = host.session.mark_settings_imported(Utc::now()).await {
                warn!(error = %e, "Failed to record settings import time");
            }
            if let Err(e) = host.session.post_state_to_webview().await {
                warn!(error = %e, "Failed to refresh webview state");
            }
            let message = format!("Settings imported from {}", path.display());
            info!(path = %path.display(), "Settings imported");
            host.notifier.show_info(&message);
            true
        }
        other => {
            if let Err(e) = other {
                warn!(path = %path.display(), error = %e, "Settings import failed");
            }
            let message = format!(
                "Warning: could not import rooSettings.json file not found at {}",
                path.display()
            );
            channel.append_line(message.as_str());
            host.notifier.show_warning(&message);
            false
        }
    }
}

/// 허용 명령 목록에서 정확히 일치하는 명령 하나 제거
///
/// 목록에 없으면 아무것도 쓰지 않고 `false`.
pub async fn remove_allowed_command(host: &HostServices, command: &str) -> Result<bool> {
    let mut commands = host.session.allowed_commands().await?;
    let before = commands.len();
    commands.retain(|c| c != command);
    if commands.len() == before {
        debug!(command, "Command not in allowed list");
        return Ok(false);
    }
    host.session.set_allowed_commands(commands).await?;
    info!(command, "Removed command from allowed list");
    Ok(true)
}

/// 외부 설정 파일 감시기
pub struct SettingsWatcher {
    host: HostServices,
    channel: OutputChannel,
    path: PathBuf,
    bus: Option<Arc<EventBus>>,
}

impl SettingsWatcher {
    pub fn new(host: HostServices, channel: OutputChannel, path: impl Into<PathBuf>) -> Self {
        Self {
            host,
            channel,
            path: path.into(),
            bus: None,
        }
    }

    /// import 성공 시 `system.settings_imported` 발행
    pub fn with_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn import(&self) -> bool {
        let imported = import_host_settings(&self.host, &self.channel, &self.path).await;
        if imported {
            if let Some(bus) = &self.bus {
                bus.publish(system::settings_imported(&self.path.display().to_string()))
                    .await;
            }
        }
        imported
    }

    /// 시작 시 한 번 import (파일이 없으면 경고)
    pub async fn initial_import(&self) -> bool {
        if tokio::fs::metadata(&self.path).await.is_ok() {
            self.channel.append_line(format!(
                "rooSettings.json file found importing at: {}",
                self.path.display()
            ));
            self.import().await
        } else {
            let message = format!(
                "Warning: rooSettings.json file not found at {}",
                self.path.display()
            );
            warn!("{}", message);
            self.channel.append_line(message.as_str());
            self.host.notifier.show_warning(&message);
            false
        }
    }

    /// 설정 파일을 감시하며 생성/수정 시 다시 import
    ///
    /// 부모 디렉토리가 아직 없으면 가장 가까운 기존 상위 디렉토리를 감시하고,
    /// 경로상의 디렉토리가 생길 때마다 한 단계씩 다시 건다.
    pub async fn start(self) -> Result<WatchHandle> {
        self.initial_import().await;

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| Error::Watch(format!("not a file path: {}", self.path.display())))?
            .to_os_string();
        let mut anchor = nearest_existing_dir(&self.path).ok_or_else(|| {
            Error::Watch(format!("no existing parent directory for {}", self.path.display()))
        })?;

        let (mut watcher, mut rx) = event_watcher()?;
        watch_path(&mut watcher, &anchor, RecursiveMode::NonRecursive)?;
        debug!(path = %self.path.display(), anchor = %anchor.display(), "Watching settings file");

        let task = tokio::spawn(async move {
            let debounce = Duration::from_millis(SETTINGS_DEBOUNCE_MS);
            let mut pending = false;
            loop {
                tokio::select! {
                    event = rx.recv() => {
                        let Some(event) = event else { break };
                        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                            continue;
                        }
                        // anchor 바로 아래에서 감시 대상 경로로 이어지는 이름
                        let watched = if self.path.parent() == Some(anchor.as_path()) {
                            Some(file_name.clone())
                        } else {
                            next_component(&anchor, &self.path)
                        };
                        let hit = event
                            .paths
                            .iter()
                            .any(|p| p.file_name().is_some() && p.file_name() == watched.as_deref());
                        if !hit {
                            continue;
                        }
                        if self.path.parent() == Some(anchor.as_path()) {
                            pending = true;
                            continue;
                        }

                        // 감시를 거는 사이에 더 깊은 디렉토리가 생겼을 수 있으므로 안정될 때까지 반복
                        while let Some(next) = nearest_existing_dir(&self.path) {
                            if next == anchor {
                                break;
                            }
                            let _ = watcher.unwatch(&anchor);
                            if let Err(e) = watch_path(&mut watcher, &next, RecursiveMode::NonRecursive) {
                                warn!(error = %e, "Failed to re-arm settings watcher");
                                let _ = watch_path(&mut watcher, &anchor, RecursiveMode::NonRecursive);
                                break;
                            }
                            debug!(anchor = %next.display(), "Settings watcher moved closer");
                            anchor = next;
                        }
                        if tokio::fs::metadata(&self.path).await.is_ok() {
                            pending = true;
                        }
                    }
                    _ = tokio::time::sleep(debounce), if pending => {
                        pending = false;
                        self.channel.append_line(format!(
                            "rooSettings.json file created/changed, importing at: {}",
                            self.path.display()
                        ));
                        self.import().await;
                    }
                }
            }
        });

        Ok(WatchHandle::new("settings", task, None))
    }
}

/// `path`의 가장 가까운 기존 상위 디렉토리
fn nearest_existing_dir(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .skip(1)
        .filter(|p| !p.as_os_str().is_empty())
        .find(|p| p.is_dir())
        .map(Path::to_path_buf)
}

/// `anchor` 바로 아래에서 `path`로 이어지는 구성요소 이름
fn next_component(anchor: &Path, path: &Path) -> Option<OsString> {
    path.strip_prefix(anchor)
        .ok()?
        .components()
        .next()
        .map(|c| c.as_os_str().to_os_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aos_host::{LocalHost, NoticeLevel, RecordingNotifier, SessionHost};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn local(temp: &TempDir) -> (Arc<LocalHost>, RecordingNotifier, HostServices) {
        let host = Arc::new(LocalHost::new(temp.path()));
        let notifier = RecordingNotifier::new();
        let services = HostServices::local(host.clone(), Arc::new(notifier.clone()));
        (host, notifier, services)
    }

    #[tokio::test]
    async fn test_remove_allowed_command_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let (host, _, services) = local(&temp);
        host.set_allowed_commands(vec!["npm test".into(), "git status".into(), "npm test --watch".into()])
            .await
            .unwrap();

        assert!(remove_allowed_command(&services, "npm test").await.unwrap());
        assert!(!remove_allowed_command(&services, "npm test").await.unwrap());
        assert_eq!(
            host.allowed_commands().await.unwrap(),
            vec!["git status".to_string(), "npm test --watch".to_string()]
        );
    }

    #[tokio::test]
    async fn test_initial_import_missing_file_warns() {
        let temp = TempDir::new().unwrap();
        let (host, notifier, services) = local(&temp);
        let channel = OutputChannel::new("test");
        let path = temp.path().join("roo-code-settings.json");

        let watcher = SettingsWatcher::new(services, channel.clone(), &path);
        assert!(!watcher.initial_import().await);

        let expected = format!("Warning: rooSettings.json file not found at {}", path.display());
        assert!(channel.contains(&expected));
        assert_eq!(notifier.messages(NoticeLevel::Warning), vec![expected]);
        assert_eq!(host.webview_post_count(), 0);
    }

    #[tokio::test]
    async fn test_import_host_settings_success_refreshes_webview() {
        let temp = TempDir::new().unwrap();
        let (host, notifier, services) = local(&temp);
        let channel = OutputChannel::new("test");
        let path = temp.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{ "providerProfiles": { "currentApiConfigName": "a", "apiConfigs": {} }, "globalSettings": { "language": "ko" } }"#,
        )
        .unwrap();

        assert!(import_host_settings(&services, &channel, &path).await);
        assert_eq!(host.webview_post_count(), 1);
        assert!(host.settings_imported_at().is_some());
        assert_eq!(notifier.messages(NoticeLevel::Info).len(), 1);
        assert_eq!(host.state().await.unwrap().language.as_deref(), Some("ko"));
    }

    #[tokio::test]
    async fn test_import_host_settings_failure_warns() {
        let temp = TempDir::new().unwrap();
        let (host, _, services) = local(&temp);
        let channel = OutputChannel::new("test");
        let path = temp.path().join("broken.json");
        std::fs::write(&path, "{").unwrap();

        assert!(!import_host_settings(&services, &channel, &path).await);
        assert!(channel.contains("Warning: could not import rooSettings.json file not found at"));
        assert!(host.settings_imported_at().is_none());
    }

    #[tokio::test]
    async fn test_watcher_reimports_on_change() {
        let temp = TempDir::new().unwrap();
        let (host, _, services) = local(&temp);
        let channel = OutputChannel::new("test");
        let path = temp.path().join("roo-code-settings.json");

        let handle = SettingsWatcher::new(services, channel.clone(), &path)
            .start()
            .await
            .unwrap();
        assert!(handle.is_running());

        std::fs::write(
            &path,
            r#"{ "providerProfiles": { "currentApiConfigName": "a", "apiConfigs": {} }, "globalSettings": { "mode": "debug" } }"#,
        )
        .unwrap();

        let mut imported = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if host.webview_post_count() > 0 {
                imported = true;
                break;
            }
        }
        assert!(imported);
        assert!(channel.contains("rooSettings.json file created/changed, importing at:"));
        handle.stop();
    }

    #[tokio::test]
    async fn test_watcher_waits_for_missing_parent() {
        let temp = TempDir::new().unwrap();
        let (host, _, services) = local(&temp);
        let channel = OutputChannel::new("test");
        let dir = temp.path().join("aos");
        let path = dir.join("roo-code-settings.json");

        let handle = SettingsWatcher::new(services, channel.clone(), &path)
            .start()
            .await
            .unwrap();
        assert!(handle.is_running());

        std::fs::create_dir(&dir).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        std::fs::write(
            &path,
            r#"{ "providerProfiles": { "currentApiConfigName": "a", "apiConfigs": {} }, "globalSettings": { "mode": "ask" } }"#,
        )
        .unwrap();

        let mut imported = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if host.webview_post_count() > 0 {
                imported = true;
                break;
            }
        }
        assert!(imported);
        assert_eq!(host.state().await.unwrap().mode.as_deref(), Some("ask"));
        handle.stop();
    }

    #[test]
    fn test_nearest_existing_dir() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a/b/settings.json");
        assert_eq!(nearest_existing_dir(&path).as_deref(), Some(temp.path()));
        assert_eq!(
            next_component(temp.path(), &path),
            Some(OsString::from("a"))
        );
        assert!(nearest_existing_dir(Path::new("settings.json")).is_none());
    }
}
