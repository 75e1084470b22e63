//! AOS Config - 애드온 설정
//!
//! 아카이브 경로, 데이터 풀 이름, 감시 대상 파일 등을 관리하는 AosConfig

use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 설정 파일명
pub const AOS_CONFIG_FILE: &str = "config.json";

/// 데이터 풀 폴더 이름 기본값
pub const DEFAULT_DATA_POOL_DIR: &str = "aos-data-pool";

/// 외부 설정 파일 기본 경로
pub const DEFAULT_SETTINGS_FILE: &str = "/aos/roo-code-settings.json";

/// 출력 채널 이름 기본값
pub const DEFAULT_CHANNEL_NAME: &str = "Agent-Operating-System";

// ============================================================================
// AosConfig
// ============================================================================

/// AOS 애드온 설정
///
/// 글로벌(`~/.config/aos/config.json`) 위에 프로젝트(`.aos/config.json`)를 덮어씀
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AosConfig {
    /// 위로 탐색할 데이터 풀 폴더 이름
    #[serde(default = "default_data_pool_dir_name")]
    pub data_pool_dir_name: String,

    /// 워크스페이스 내부 아카이브 디렉토리 (워크스페이스 루트 기준)
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,

    /// 데이터 풀 내부 아카이브 디렉토리 (데이터 풀 기준)
    #[serde(default = "default_data_pool_archive_dir")]
    pub data_pool_archive_dir: PathBuf,

    /// 감시할 외부 설정 파일
    #[serde(default = "default_settings_file")]
    pub settings_file: PathBuf,

    /// 프롬프트 파일 glob 패턴
    #[serde(default = "default_prompt_globs")]
    pub prompt_globs: Vec<String>,

    /// 시작 시 검사할 iterate 프롬프트 파일 이름
    #[serde(default = "default_iterate_prompt_file")]
    pub iterate_prompt_file: String,

    /// 출력 채널 이름
    #[serde(default = "default_channel_name")]
    pub channel_name: String,

    /// 설정 파일 감시 활성화
    #[serde(default = "default_true")]
    pub watch_settings: bool,

    /// 프롬프트 파일 감시 활성화
    #[serde(default = "default_true")]
    pub watch_prompts: bool,

    /// 아카이브 복사 시 하위 디렉토리까지 복사
    #[serde(default)]
    pub archive_recursive: bool,
}

/// 설정 파일 한 층 (글로벌 또는 프로젝트)
///
/// 파일에 있는 키만 `Some`. 없는 키는 아래 층의 값을 유지한다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AosConfigLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_pool_dir_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_pool_archive_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_globs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterate_prompt_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_settings: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_prompts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_recursive: Option<bool>,
}

impl Default for AosConfig {
    fn default() -> Self {
        Self {
            data_pool_dir_name: default_data_pool_dir_name(),
            archive_dir: default_archive_dir(),
            data_pool_archive_dir: default_data_pool_archive_dir(),
            settings_file: default_settings_file(),
            prompt_globs: default_prompt_globs(),
            iterate_prompt_file: default_iterate_prompt_file(),
            channel_name: default_channel_name(),
            watch_settings: true,
            watch_prompts: true,
            archive_recursive: false,
        }
    }
}

impl AosConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let mut config = Self::new();

        // 1. 글로벌 설정
        if let Ok(global) = JsonStore::global() {
            if let Some(layer) = global.load_optional::<AosConfigLayer>(AOS_CONFIG_FILE)? {
                config.merge(layer);
            }
        }

        // 2. 프로젝트 설정
        let project = JsonStore::project(workspace_root);
        if let Some(layer) = project.load_optional::<AosConfigLayer>(AOS_CONFIG_FILE)? {
            config.merge(layer);
        }

        Ok(config)
    }

    /// 프로젝트 설정 저장
    pub fn save_project(&self, workspace_root: &Path) -> Result<()> {
        JsonStore::project(workspace_root).save(AOS_CONFIG_FILE, self)
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 설정 층 적용 (layer에 있는 키만 덮어씀)
    pub fn merge(&mut self, layer: AosConfigLayer) {
        if let Some(v) = layer.data_pool_dir_name {
            self.data_pool_dir_name = v;
        }
        if let Some(v) = layer.archive_dir {
            self.archive_dir = v;
        }
        if let Some(v) = layer.data_pool_archive_dir {
            self.data_pool_archive_dir = v;
        }
        if let Some(v) = layer.settings_file {
            self.settings_file = v;
        }
        if let Some(v) = layer.prompt_globs {
            self.prompt_globs = v;
        }
        if let Some(v) = layer.iterate_prompt_file {
            self.iterate_prompt_file = v;
        }
        if let Some(v) = layer.channel_name {
            self.channel_name = v;
        }
        if let Some(v) = layer.watch_settings {
            self.watch_settings = v;
        }
        if let Some(v) = layer.watch_prompts {
            self.watch_prompts = v;
        }
        if let Some(v) = layer.archive_recursive {
            self.archive_recursive = v;
        }
    }

    // ========================================================================
    // Paths
    // ========================================================================

    /// 워크스페이스 아카이브 경로: `<workspace>/.aos/task-log/entry/<taskId>`
    pub fn local_archive_path(&self, workspace_root: &Path, task_id: &str) -> PathBuf {
        workspace_root.join(&self.archive_dir).join(task_id)
    }

    /// 데이터 풀 아카이브 경로: `<pool>/task-log/entry/<taskId>`
    pub fn data_pool_archive_path(&self, data_pool: &Path, task_id: &str) -> PathBuf {
        data_pool.join(&self.data_pool_archive_dir).join(task_id)
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn settings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_file = path.into();
        self
    }

    pub fn data_pool_dir_name(mut self, name: impl Into<String>) -> Self {
        self.data_pool_dir_name = name.into();
        self
    }

    pub fn watch_settings(mut self, enabled: bool) -> Self {
        self.watch_settings = enabled;
        self
    }

    pub fn watch_prompts(mut self, enabled: bool) -> Self {
        self.watch_prompts = enabled;
        self
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn default_data_pool_dir_name() -> String {
    DEFAULT_DATA_POOL_DIR.to_string()
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from(".aos").join("task-log").join("entry")
}

fn default_data_pool_archive_dir() -> PathBuf {
    PathBuf::from("task-log").join("entry")
}

fn default_settings_file() -> PathBuf {
    PathBuf::from(DEFAULT_SETTINGS_FILE)
}

fn default_prompt_globs() -> Vec<String> {
    vec!["**/system.prmt".to_string(), "**/iterate.prmt".to_string()]
}

fn default_iterate_prompt_file() -> String {
    "iterate.prmt".to_string()
}

fn default_channel_name() -> String {
    DEFAULT_CHANNEL_NAME.to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aos_config_default() {
        let config = AosConfig::new();
        assert_eq!(config.data_pool_dir_name, "aos-data-pool");
        assert_eq!(config.settings_file, PathBuf::from("/aos/roo-code-settings.json"));
        assert!(!config.archive_recursive);
        assert_eq!(config.prompt_globs.len(), 2);
    }

    #[test]
    fn test_archive_paths() {
        let config = AosConfig::new();
        assert_eq!(
            config.local_archive_path(Path::new("/ws"), "T1"),
            PathBuf::from("/ws/.aos/task-log/entry/T1")
        );
        assert_eq!(
            config.data_pool_archive_path(Path::new("/pool"), "T1"),
            PathBuf::from("/pool/task-log/entry/T1")
        );
    }

    #[test]
    fn test_config_merge_project_wins() {
        let mut config = AosConfig::new();
        config.merge(AosConfigLayer {
            data_pool_dir_name: Some("global-pool".into()),
            watch_settings: Some(false),
            ..Default::default()
        });

        let project: AosConfigLayer = serde_json::from_str(
            r#"{ "settingsFile": "/etc/aos/settings.json", "watchPrompts": false }"#,
        )
        .unwrap();
        config.merge(project);

        // 프로젝트에 없는 키는 글로벌 값 유지
        assert_eq!(config.data_pool_dir_name, "global-pool");
        assert!(!config.watch_settings);
        assert_eq!(config.settings_file, PathBuf::from("/etc/aos/settings.json"));
        assert!(!config.watch_prompts);
    }

    #[test]
    fn test_config_merge_explicit_default_overrides() {
        let mut config = AosConfig::new();
        config.merge(AosConfigLayer {
            data_pool_dir_name: Some("global-pool".into()),
            ..Default::default()
        });

        let project: AosConfigLayer =
            serde_json::from_str(r#"{ "dataPoolDirName": "aos-data-pool", "watchSettings": true }"#)
                .unwrap();
        config.merge(project);

        assert_eq!(config.data_pool_dir_name, DEFAULT_DATA_POOL_DIR);
        assert!(config.watch_settings);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AosConfig =
            serde_json::from_str(r#"{ "dataPoolDirName": "pool" }"#).unwrap();
        assert_eq!(config.data_pool_dir_name, "pool");
        assert_eq!(config.channel_name, DEFAULT_CHANNEL_NAME);
        assert!(config.watch_settings);
    }

    #[test]
    fn test_load_project_config() {
        let dir = tempfile::tempdir().unwrap();
        AosConfig::new()
            .data_pool_dir_name("team-pool")
            .save_project(dir.path())
            .unwrap();

        let loaded = AosConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.data_pool_dir_name, "team-pool");
    }
}
