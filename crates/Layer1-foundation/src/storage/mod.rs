//! Storage - JSON 파일 저장소
//!
//! - `json`: JSON - 설정 파일 저장/로드, 스냅샷 쓰기

mod json;

pub use json::{write_json_pretty, JsonStore, AOS_DIR};
