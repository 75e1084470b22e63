//! 메시지를 기록하는 notifier

use crate::services::UserNotifier;
use parking_lot::Mutex;
use std::sync::Arc;

/// 알림 수준
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// 기록된 알림
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// 알림을 메모리에 쌓고 tracing으로도 내보내는 notifier
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// 해당 수준의 메시지만
    pub fn messages(&self, level: NoticeLevel) -> Vec<String> {
        self.notices
            .lock()
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.message.clone())
            .collect()
    }

    fn record(&self, level: NoticeLevel, message: &str) {
        self.notices.lock().push(Notice {
            level,
            message: message.to_string(),
        });
    }
}

impl UserNotifier for RecordingNotifier {
    fn show_info(&self, message: &str) {
        tracing::info!(target: "aos::notify", "{}", message);
        self.record(NoticeLevel::Info, message);
    }

    fn show_warning(&self, message: &str) {
        tracing::warn!(target: "aos::notify", "{}", message);
        self.record(NoticeLevel::Warning, message);
    }

    fn show_error(&self, message: &str) {
        tracing::error!(target: "aos::notify", "{}", message);
        self.record(NoticeLevel::Error, message);
    }
}
