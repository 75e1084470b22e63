//! Config - 애드온 설정 관리
//!
//! - `aos.rs` - AosConfig 통합 설정

mod aos;

pub use aos::{
    AosConfig, AosConfigLayer, AOS_CONFIG_FILE, DEFAULT_CHANNEL_NAME, DEFAULT_DATA_POOL_DIR,
    DEFAULT_SETTINGS_FILE,
};
