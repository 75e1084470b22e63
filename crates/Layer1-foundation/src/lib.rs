//! # aos-foundation
//!
//! Foundation layer for AOS:
//! - Error: 중앙 에러 타입
//! - Config: 애드온 설정 (AosConfig)
//! - Event: 호스트 이벤트 버스 (task.*, workspace.*)
//! - Channel: 출력 채널 (사람이 읽는 로그)
//! - Storage: JsonStore, pretty JSON 쓰기
//! - Fsutil: 상위 폴더 탐색, 디렉토리 복사
//! - EnvDetect: 호스트 머신/사용자 정보
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Host (editor extension)                                 │
//! │        │ task.started / task.completed                   │
//! │        ▼                                                 │
//! │   EventBus ──► listeners (aos-tasklog)                   │
//! │                     │                                    │
//! │          ┌──────────┴──────────┐                         │
//! │          ▼                     ▼                         │
//! │   OutputChannel          JsonStore / fsutil              │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod channel;
pub mod config;
pub mod env_detect;
pub mod error;
pub mod event;
pub mod fsutil;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    AosConfig, AosConfigLayer, AOS_CONFIG_FILE, DEFAULT_CHANNEL_NAME, DEFAULT_DATA_POOL_DIR,
    DEFAULT_SETTINGS_FILE,
};

// ============================================================================
// Event (이벤트 시스템)
// ============================================================================
pub use event::{
    AosEvent, EventBus, EventCategory, EventId, EventListener, ListenerId, TokenUsage,
};

// ============================================================================
// Channel / Storage / Filesystem
// ============================================================================
pub use channel::{OutputChannel, DEFAULT_CHANNEL_CAPACITY};
pub use fsutil::{copy_dir, locate_folder};
pub use storage::{write_json_pretty, JsonStore, AOS_DIR};

// ============================================================================
// Environment Detection (환경 감지)
// ============================================================================
pub use env_detect::{arch_id, HostFacts, InterfaceAddress, OsType, UserInfo};
