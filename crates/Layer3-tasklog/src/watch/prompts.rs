//! Prompt file monitor
//!
//! 워크스페이스 루트 아래에서 `system.prmt` / `iterate.prmt` 생성 감지.

use super::{event_watcher, timestamp, watch_path, WatchHandle};
use aos_foundation::event::WORKSPACE_FOLDERS_CHANGED;
use aos_foundation::{AosConfig, AosEvent, Error, EventCategory, EventListener, OutputChannel, Result};
use aos_host::UserNotifier;
use async_trait::async_trait;
use glob::Pattern;
use notify::{EventKind, RecommendedWatcher, RecursiveMode};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// 감지된 프롬프트 파일 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    System,
    Iterate,
}

/// 프롬프트 파일 감시기
///
/// 워크스페이스 폴더가 추가되면 (`workspace.folders_changed`) 새 루트도 감시하고 검사한다.
pub struct PromptMonitor {
    channel: OutputChannel,
    notifier: Arc<dyn UserNotifier>,
    patterns: Vec<Pattern>,
    iterate_file: String,
    roots: Mutex<Vec<PathBuf>>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl PromptMonitor {
    pub fn new(config: &AosConfig, channel: OutputChannel, notifier: Arc<dyn UserNotifier>) -> Result<Self> {
        let patterns = config
            .prompt_globs
            .iter()
            .map(|glob| {
                Pattern::new(glob).map_err(|e| Error::Config(format!("invalid prompt glob '{}': {}", glob, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            channel,
            notifier,
            patterns,
            iterate_file: config.iterate_prompt_file.clone(),
            roots: Mutex::new(Vec::new()),
            watcher: Mutex::new(None),
        })
    }

    /// 경로가 프롬프트 파일이면 종류를 돌려준다
    ///
    /// glob은 감시 루트 기준 상대 경로에 대해 검사한다.
    pub fn classify(&self, path: &Path) -> Option<PromptKind> {
        let relative = self
            .roots
            .lock()
            .iter()
            .find_map(|root| path.strip_prefix(root).ok().map(Path::to_path_buf))
            .unwrap_or_else(|| path.to_path_buf());

        if !self.patterns.iter().any(|p| p.matches_path(&relative)) {
            return None;
        }

        let is_iterate = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy() == self.iterate_file.as_str());
        Some(if is_iterate {
            PromptKind::Iterate
        } else {
            PromptKind::System
        })
    }

    /// 생성 이벤트 처리
    pub fn handle_created(&self, path: &Path) -> Option<PromptKind> {
        let kind = self.classify(path)?;
        let message = match kind {
            PromptKind::System => format!("System prompt file changed at {}: {}", timestamp(), path.display()),
            PromptKind::Iterate => format!("Iterate prompt file detected at {}: {}", timestamp(), path.display()),
        };
        self.channel.append_line(message.as_str());
        self.notifier.show_info(&message);
        Some(kind)
    }

    /// 루트 바로 아래의 iterate 프롬프트 파일 검사
    pub async fn scan_folder(&self, root: &Path) -> bool {
        let candidate = root.join(&self.iterate_file);
        match tokio::fs::metadata(&candidate).await {
            Ok(meta) if meta.is_file() => {
                let message = format!(
                    "Iterate prompt file found at {}: {}",
                    timestamp(),
                    candidate.display()
                );
                self.channel.append_line(message.as_str());
                self.notifier.show_info(&message);
                true
            }
            _ => false,
        }
    }

    /// 루트 감시 추가 (이미 감시 중이면 무시)
    pub fn add_root(&self, root: &Path) -> Result<()> {
        {
            let mut roots = self.roots.lock();
            if roots.iter().any(|r| r == root) {
                return Ok(());
            }
            roots.push(root.to_path_buf());
        }

        if let Some(watcher) = self.watcher.lock().as_mut() {
            watch_path(watcher, root, RecursiveMode::Recursive)?;
        }
        debug!(root = %root.display(), "Watching for prompt files");
        Ok(())
    }

    /// 감시 시작: 각 루트를 검사하고 생성 이벤트 처리 태스크를 띄운다
    pub async fn start(self: &Arc<Self>, roots: &[PathBuf]) -> Result<WatchHandle> {
        let (watcher, mut rx) = event_watcher()?;
        *self.watcher.lock() = Some(watcher);

        for root in roots {
            if let Err(e) = self.add_root(root) {
                warn!(error = %e, "Prompt watch not registered");
            }
            self.scan_folder(root).await;
        }

        let monitor = Arc::clone(self);
        let task = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if !matches!(event.kind, EventKind::Create(_)) {
                    continue;
                }
                for path in &event.paths {
                    monitor.handle_created(path);
                }
            }
        });

        Ok(WatchHandle::new("prompts", task, None))
    }

    /// 감시 해제 (watcher drop)
    pub fn shutdown(&self) {
        self.watcher.lock().take();
    }
}

#[async_trait]
impl EventListener for PromptMonitor {
    fn name(&self) -> &str {
        "prompt-monitor"
    }

    fn categories(&self) -> Option<Vec<EventCategory>> {
        Some(vec![EventCategory::Workspace])
    }

    async fn on_event(&self, event: &AosEvent) {
        if event.event_type != WORKSPACE_FOLDERS_CHANGED {
            return;
        }
        for folder in event.added_folders() {
            if let Err(e) = self.add_root(&folder) {
                warn!(folder = %folder.display(), error = %e, "Prompt watch not registered");
            }
            self.scan_folder(&folder).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aos_foundation::event::workspace;
    use aos_host::{NoticeLevel, RecordingNotifier};
    use tempfile::TempDir;

    fn monitor(notifier: RecordingNotifier) -> PromptMonitor {
        PromptMonitor::new(&AosConfig::default(), OutputChannel::new("test"), Arc::new(notifier)).unwrap()
    }

    #[test]
    fn test_classify_prompt_files() {
        let monitor = monitor(RecordingNotifier::new());
        monitor.roots.lock().push(PathBuf::from("/work"));

        assert_eq!(monitor.classify(Path::new("/work/system.prmt")), Some(PromptKind::System));
        assert_eq!(
            monitor.classify(Path::new("/work/deep/dir/iterate.prmt")),
            Some(PromptKind::Iterate)
        );
        assert_eq!(monitor.classify(Path::new("/work/notes.md")), None);
        assert_eq!(monitor.classify(Path::new("/work/system.prmt.bak")), None);
    }

    #[test]
    fn test_handle_created_logs_and_notifies() {
        let notifier = RecordingNotifier::new();
        let monitor = monitor(notifier.clone());
        monitor.roots.lock().push(PathBuf::from("/work"));

        assert_eq!(
            monitor.handle_created(Path::new("/work/a/system.prmt")),
            Some(PromptKind::System)
        );
        let lines = monitor.channel.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("System prompt file changed at "));
        assert!(lines[0].ends_with(": /work/a/system.prmt"));
        assert_eq!(notifier.messages(NoticeLevel::Info), lines);
    }

    #[tokio::test]
    async fn test_folders_changed_scans_added_folder() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("iterate.prmt"), "again").unwrap();
        let monitor = monitor(RecordingNotifier::new());

        monitor
            .on_event(&workspace::folders_changed(&[temp.path().to_path_buf()]))
            .await;

        assert!(monitor.channel.contains("Iterate prompt file found at "));
        assert_eq!(monitor.roots.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_scan_folder_without_prompt() {
        let temp = TempDir::new().unwrap();
        let monitor = monitor(RecordingNotifier::new());
        assert!(!monitor.scan_folder(temp.path()).await);
        assert!(monitor.channel.lines().is_empty());
    }
}
