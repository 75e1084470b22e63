//! Event System - 이벤트 발행/구독 시스템
//!
//! 호스트가 발행하는 태스크/워크스페이스 이벤트를 AOS 리스너에게 전달합니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        EventBus                              │
//! │  publish(task.completed) ─────────────────────────────┐      │
//! │         │                                              │      │
//! │         ▼                                              ▼      │
//! │  ┌──────────────────┐                    ┌──────────────────┐ │
//! │  │  TaskLogListener │                    │  PromptWatcher   │ │
//! │  │  (Task)          │                    │  (Workspace)     │ │
//! │  └──────────────────┘                    └──────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 사용법
//!
//! ```ignore
//! use aos_foundation::event::{task, EventBus, TokenUsage};
//!
//! let bus = EventBus::new();
//! bus.subscribe(Arc::new(MyListener)).await;
//! bus.publish(task::completed("T1", &TokenUsage::default())).await;
//! ```

pub mod bus;
pub mod types;

pub use bus::{EventBus, EventListener, ListenerId};

pub use types::{
    // Event constructors
    system,
    task,
    workspace,
    // Core types
    AosEvent,
    EventCategory,
    EventId,
    TokenUsage,
    // Event type names
    TASK_ABORTED,
    TASK_COMPLETED,
    TASK_DELETED,
    TASK_STARTED,
    WORKSPACE_FOLDERS_CHANGED,
};
