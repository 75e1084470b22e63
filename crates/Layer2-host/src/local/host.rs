//! LocalHost - 파일 기반 호스트 구현
//!
//! ```text
//! <workspace>/.aos/host/
//! ├── provider-profiles.json   # { currentApiConfigName, apiConfigs, ... }
//! ├── global-settings.json     # SessionState 키 (camelCase) + 기타
//! ├── custom-modes.json        # { customModes: [ModeConfig] }
//! └── tasks/<taskId>/          # 태스크 저장 디렉토리
//! ```

use crate::mode::ModeConfig;
use crate::session::{ApiConfigMeta, ApiConfiguration, SessionState, TaskHandle, WorkspaceFolder};
use crate::services::SessionHost;
use crate::settings::{
    CustomModesManager, GlobalSettingsManager, ProviderProfiles, ProviderSettingsManager,
};
use aos_foundation::{Error, JsonStore, Result, AOS_DIR};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// 호스트 데이터 디렉토리 (`.aos/` 하위)
pub const HOST_DIR: &str = "host";
pub const PROVIDER_PROFILES_FILE: &str = "provider-profiles.json";
pub const GLOBAL_SETTINGS_FILE: &str = "global-settings.json";
pub const CUSTOM_MODES_FILE: &str = "custom-modes.json";
pub const TASKS_DIR: &str = "tasks";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomModesFile {
    #[serde(default)]
    custom_modes: Vec<ModeConfig>,
}

/// 파일 기반 호스트
#[derive(Debug)]
pub struct LocalHost {
    workspace_root: PathBuf,
    folders: RwLock<Vec<PathBuf>>,
    store: JsonStore,
    webview_posts: AtomicUsize,
    settings_imported_at: Mutex<Option<DateTime<Utc>>>,
}

impl LocalHost {
    /// 워크스페이스 루트 하나로 시작
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        let workspace_root = workspace_root.into();
        let store = JsonStore::new(workspace_root.join(AOS_DIR).join(HOST_DIR));
        Self {
            folders: RwLock::new(vec![workspace_root.clone()]),
            workspace_root,
            store,
            webview_posts: AtomicUsize::new(0),
            settings_imported_at: Mutex::new(None),
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn host_dir(&self) -> &Path {
        self.store.base_dir()
    }

    /// 워크스페이스 폴더 추가 (이미 있으면 무시)
    pub fn add_folder(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        let mut folders = self.folders.write();
        if !folders.contains(&path) {
            folders.push(path);
        }
    }

    /// 모든 워크스페이스 폴더 닫기
    pub fn clear_folders(&self) {
        self.folders.write().clear();
    }

    /// 태스크 디렉토리 생성 (이미 있으면 그대로 사용)
    pub async fn create_task(&self, task_id: &str) -> Result<TaskHandle> {
        let task_dir_path = self.task_dir(task_id)?;
        tokio::fs::create_dir_all(&task_dir_path).await?;
        debug!(task_id, dir = %task_dir_path.display(), "Task directory ready");
        Ok(TaskHandle {
            task_id: task_id.to_string(),
            task_dir_path,
        })
    }

    /// 웹뷰 갱신 요청 횟수
    pub fn webview_post_count(&self) -> usize {
        self.webview_posts.load(Ordering::SeqCst)
    }

    pub fn settings_imported_at(&self) -> Option<DateTime<Utc>> {
        *self.settings_imported_at.lock()
    }

    fn task_dir(&self, task_id: &str) -> Result<PathBuf> {
        let valid = !task_id.is_empty()
            && task_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && task_id != "."
            && task_id != "..";
        if !valid {
            return Err(Error::InvalidInput(format!("invalid task id '{}'", task_id)));
        }
        Ok(self.store.file_path(TASKS_DIR).join(task_id))
    }

    fn load_profiles(&self) -> Result<ProviderProfiles> {
        Ok(self
            .store
            .load_optional::<ProviderProfiles>(PROVIDER_PROFILES_FILE)?
            .unwrap_or_default())
    }

    fn load_global(&self) -> Result<Map<String, Value>> {
        Ok(self
            .store
            .load_optional::<Map<String, Value>>(GLOBAL_SETTINGS_FILE)?
            .unwrap_or_default())
    }

    fn load_custom_modes(&self) -> Result<Vec<ModeConfig>> {
        Ok(self
            .store
            .load_optional::<CustomModesFile>(CUSTOM_MODES_FILE)?
            .unwrap_or_default()
            .custom_modes)
    }
}

// ============================================================================
// SessionHost
// ============================================================================

#[async_trait]
impl SessionHost for LocalHost {
    fn cwd(&self) -> PathBuf {
        self.workspace_root.clone()
    }

    fn workspace_folders(&self) -> Option<Vec<WorkspaceFolder>> {
        let folders = self.folders.read();
        if folders.is_empty() {
            return None;
        }
        Some(
            folders
                .iter()
                .enumerate()
                .map(|(index, path)| WorkspaceFolder::from_path(path.clone(), index))
                .collect(),
        )
    }

    async fn state(&self) -> Result<SessionState> {
        let mut state: SessionState = serde_json::from_value(Value::Object(self.load_global()?))?;
        let profiles = self.load_profiles()?;

        if let Some(active) = profiles.api_configs.get(&profiles.current_api_config_name) {
            state.api_configuration = serde_json::from_value::<ApiConfiguration>(active.clone())?;
        }
        if !profiles.current_api_config_name.is_empty() {
            state.current_api_config_name = Some(profiles.current_api_config_name.clone());
        }
        state.list_api_config_meta = profiles
            .api_configs
            .iter()
            .map(|(name, config)| ApiConfigMeta {
                id: config
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or(name)
                    .to_string(),
                name: name.clone(),
                api_provider: profiles.provider_of(name).map(str::to_string),
            })
            .collect();

        Ok(state)
    }

    async fn task_with_id(&self, task_id: &str) -> Result<TaskHandle> {
        let task_dir_path = self.task_dir(task_id)?;
        match tokio::fs::metadata(&task_dir_path).await {
            Ok(meta) if meta.is_dir() => Ok(TaskHandle {
                task_id: task_id.to_string(),
                task_dir_path,
            }),
            _ => Err(Error::TaskNotFound(task_id.to_string())),
        }
    }

    async fn post_state_to_webview(&self) -> Result<()> {
        self.webview_posts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn mark_settings_imported(&self, at: DateTime<Utc>) -> Result<()> {
        *self.settings_imported_at.lock() = Some(at);
        Ok(())
    }

    async fn allowed_commands(&self) -> Result<Vec<String>> {
        Ok(self.state().await?.allowed_commands)
    }

    async fn set_allowed_commands(&self, commands: Vec<String>) -> Result<()> {
        let mut global = self.load_global()?;
        global.insert("allowedCommands".to_string(), serde_json::to_value(commands)?);
        self.store.save(GLOBAL_SETTINGS_FILE, &global)
    }
}

// ============================================================================
// Settings managers
// ============================================================================

#[async_trait]
impl ProviderSettingsManager for LocalHost {
    async fn export(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.load_profiles()?)?)
    }

    async fn import(&self, profiles: Value) -> Result<()> {
        let profiles: ProviderProfiles = serde_json::from_value(profiles)?;
        self.store.save(PROVIDER_PROFILES_FILE, &profiles)
    }
}

#[async_trait]
impl GlobalSettingsManager for LocalHost {
    async fn export(&self) -> Result<Value> {
        let mut global = self.load_global()?;
        let modes = self.load_custom_modes()?;
        if !modes.is_empty() {
            global.insert("customModes".to_string(), serde_json::to_value(modes)?);
        }
        Ok(Value::Object(global))
    }

    async fn import(&self, settings: Value) -> Result<()> {
        let Value::Object(mut settings) = settings else {
            return Err(Error::InvalidInput("globalSettings must be an object".to_string()));
        };
        // 커스텀 모드는 CustomModesManager 소유
        settings.remove("customModes");

        let mut global = self.load_global()?;
        global.extend(settings);
        self.store.save(GLOBAL_SETTINGS_FILE, &global)
    }
}

#[async_trait]
impl CustomModesManager for LocalHost {
    async fn custom_modes(&self) -> Result<Vec<ModeConfig>> {
        self.load_custom_modes()
    }

    async fn update_custom_mode(&self, slug: &str, mut mode: ModeConfig) -> Result<()> {
        mode.slug = slug.to_string();
        let mut modes = self.load_custom_modes()?;
        match modes.iter_mut().find(|m| m.slug == slug) {
            Some(existing) => *existing = mode,
            None => modes.push(mode),
        }
        self.store.save(
            CUSTOM_MODES_FILE,
            &CustomModesFile {
                custom_modes: modes,
            },
        )
    }
}
