//! File watchers
//!
//! `notify` 콜백 → tokio mpsc → 감시 태스크. 핸들을 drop하면 태스크가 멈춘다.

mod prompts;
mod settings;

pub use prompts::{PromptKind, PromptMonitor};
pub use settings::{import_host_settings, remove_allowed_command, SettingsWatcher};

use aos_foundation::{Error, Result};
use chrono::{SecondsFormat, Utc};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// 실행 중인 감시 태스크
pub struct WatchHandle {
    name: &'static str,
    task: JoinHandle<()>,
    watcher: Option<RecommendedWatcher>,
}

impl WatchHandle {
    pub(crate) fn new(name: &'static str, task: JoinHandle<()>, watcher: Option<RecommendedWatcher>) -> Self {
        Self { name, task, watcher }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// 감시 중지
    pub fn stop(self) {
        drop(self);
    }
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .finish()
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.watcher.take();
        self.task.abort();
        debug!(watcher = self.name, "Watcher stopped");
    }
}

/// notify 이벤트를 받는 watcher 생성
pub(crate) fn event_watcher() -> Result<(RecommendedWatcher, mpsc::UnboundedReceiver<notify::Event>)> {
    let (tx, rx) = mpsc::unbounded_channel();
    let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
        Ok(event) => {
            let _ = tx.send(event);
        }
        Err(e) => warn!(error = %e, "File watch error"),
    })
    .map_err(|e| Error::Watch(e.to_string()))?;
    Ok((watcher, rx))
}

pub(crate) fn watch_path(watcher: &mut RecommendedWatcher, path: &Path, mode: RecursiveMode) -> Result<()> {
    watcher
        .watch(path, mode)
        .map_err(|e| Error::Watch(format!("{}: {}", path.display(), e)))
}

/// 메시지용 타임스탬프 (`2024-05-01T09:30:00.000Z`)
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
