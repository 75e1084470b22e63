//! Event Types - 호스트에서 발생하는 이벤트 타입 정의
//!
//! 태스크 라이프사이클, 워크스페이스 변경 등 호스트가 발행하는 이벤트를 정의합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

// ============================================================================
// Event ID
// ============================================================================

/// 이벤트 고유 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    /// 새 이벤트 ID 생성
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Event Category
// ============================================================================

/// 이벤트 카테고리
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// 시스템 이벤트 (활성화, 설정 변경)
    System,
    /// 태스크 라이프사이클 이벤트
    Task,
    /// 워크스페이스 이벤트 (폴더 추가/제거)
    Workspace,
}

// ============================================================================
// TokenUsage - 태스크 토큰 사용량 (그대로 전달만 함)
// ============================================================================

/// 태스크 완료 시 호스트가 전달하는 토큰 사용량
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub total_tokens_in: u64,
    pub total_tokens_out: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cache_writes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cache_reads: Option<u64>,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub context_tokens: u64,
}

// ============================================================================
// AosEvent - 핵심 이벤트 타입
// ============================================================================

/// AOS 이벤트
///
/// 호스트가 발행하고 리스너가 구독하는 이벤트의 공통 구조입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AosEvent {
    /// 이벤트 ID
    pub id: EventId,

    /// 이벤트 타입 (예: "task.completed", "workspace.folders_changed")
    pub event_type: String,

    /// 이벤트 카테고리
    pub category: EventCategory,

    /// 이벤트 발생 시간
    pub timestamp: DateTime<Utc>,

    /// 이벤트 소스
    pub source: String,

    /// 태스크 ID (있는 경우)
    pub task_id: Option<String>,

    /// 이벤트 데이터
    pub data: Value,
}

impl AosEvent {
    /// 새 이벤트 생성
    pub fn new(event_type: impl Into<String>, category: EventCategory) -> Self {
        Self {
            id: EventId::new(),
            event_type: event_type.into(),
            category,
            timestamp: Utc::now(),
            source: String::new(),
            task_id: None,
            data: Value::Null,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// `task.completed` 이벤트의 토큰 사용량
    pub fn token_usage(&self) -> Option<TokenUsage> {
        self.data
            .get("usage")
            .and_then(|usage| serde_json::from_value(usage.clone()).ok())
    }

    /// `workspace.folders_changed` 이벤트에서 추가된 폴더 목록
    pub fn added_folders(&self) -> Vec<PathBuf> {
        self.data
            .get("added")
            .and_then(|added| serde_json::from_value(added.clone()).ok())
            .unwrap_or_default()
    }
}

// ============================================================================
// 사전 정의된 이벤트 타입들
// ============================================================================

/// 태스크 이벤트 타입 문자열
pub const TASK_STARTED: &str = "task.started";
pub const TASK_COMPLETED: &str = "task.completed";
pub const TASK_ABORTED: &str = "task.aborted";
pub const TASK_DELETED: &str = "task.deleted";
pub const WORKSPACE_FOLDERS_CHANGED: &str = "workspace.folders_changed";

/// 태스크 이벤트
pub mod task {
    use super::*;

    /// 태스크 시작
    pub fn started(task_id: &str) -> AosEvent {
        AosEvent::new(TASK_STARTED, EventCategory::Task)
            .with_source("host")
            .with_task(task_id)
    }

    /// 태스크 완료 (usage는 그대로 전달)
    pub fn completed(task_id: &str, usage: &TokenUsage) -> AosEvent {
        AosEvent::new(TASK_COMPLETED, EventCategory::Task)
            .with_source("host")
            .with_task(task_id)
            .with_data(serde_json::json!({
                "usage": usage,
            }))
    }

    /// 태스크 중단
    pub fn aborted(task_id: &str) -> AosEvent {
        AosEvent::new(TASK_ABORTED, EventCategory::Task)
            .with_source("host")
            .with_task(task_id)
    }

    /// 태스크 삭제
    pub fn deleted(task_id: &str) -> AosEvent {
        AosEvent::new(TASK_DELETED, EventCategory::Task)
            .with_source("host")
            .with_task(task_id)
    }
}

/// 워크스페이스 이벤트
pub mod workspace {
    use super::*;

    /// 워크스페이스 폴더 추가
    pub fn folders_changed(added: &[PathBuf]) -> AosEvent {
        AosEvent::new(WORKSPACE_FOLDERS_CHANGED, EventCategory::Workspace)
            .with_source("host")
            .with_data(serde_json::json!({
                "added": added,
            }))
    }
}

/// 시스템 이벤트
pub mod system {
    use super::*;

    /// 설정 재로드 이벤트
    pub fn settings_imported(path: &str) -> AosEvent {
        AosEvent::new("system.settings_imported", EventCategory::System)
            .with_source("settings")
            .with_data(serde_json::json!({
                "path": path,
            }))
    }
}

// ============================================================================
// 테스트
// ============================================================================
