//! Output Channel - 사람이 읽는 진행/에러 로그 스트림
//!
//! 최근 라인은 메모리에 보관되고 (오래된 것부터 버림) `tracing`으로도 남습니다.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::info;

/// 메모리에 보관하는 최대 라인 수 기본값
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// 이름이 붙은 출력 채널
#[derive(Debug, Clone)]
pub struct OutputChannel {
    name: Arc<str>,
    capacity: usize,
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl OutputChannel {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self::with_capacity(name, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(name: impl AsRef<str>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name: Arc::from(name.as_ref()),
            capacity,
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(64)))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 한 줄 추가
    pub fn append_line(&self, line: impl Into<String>) {
        let line = line.into();
        info!(target: "aos::channel", channel = %self.name, "{}", line);
        let mut lines = self.lines.lock();
        if lines.len() >= self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// 보관 중인 라인 (오래된 순)
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().iter().cloned().collect()
    }

    /// 주어진 문자열을 포함하는 라인이 있는지
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(needle))
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}
