//! Host/environment snapshots
//!
//! 환경변수, 머신 정보, 워크스페이스 폴더를 pretty JSON 파일로 남긴다.
//! 모든 writer는 덮어쓴다.

use aos_foundation::{write_json_pretty, HostFacts, InterfaceAddress, Result, UserInfo};
use aos_host::WorkspaceFolder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// `host.json`의 `hostInfo`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    pub hostname: String,
    pub platform: String,
    pub arch: String,
    pub domain_name: String,
    pub cpu_cores: usize,
    pub cpu_model: String,
    #[serde(rename = "totalMemoryGB")]
    pub total_memory_gb: String,
    #[serde(rename = "freeMemoryGB")]
    pub free_memory_gb: String,
    pub uptime_hours: String,
    pub network_interfaces: BTreeMap<String, Vec<InterfaceAddress>>,
}

impl HostInfo {
    /// 수치는 소수점 둘째 자리 문자열로
    pub fn from_facts(facts: HostFacts) -> Self {
        Self {
            hostname: facts.hostname,
            platform: facts.platform,
            arch: facts.arch,
            domain_name: facts.domain_name.unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: facts.cpu_models.len(),
            cpu_model: facts
                .cpu_models
                .into_iter()
                .next()
                .unwrap_or_else(|| "Unknown".to_string()),
            total_memory_gb: format!("{:.2}", facts.total_memory_bytes as f64 / BYTES_PER_GB),
            free_memory_gb: format!("{:.2}", facts.free_memory_bytes as f64 / BYTES_PER_GB),
            uptime_hours: format!("{:.2}", facts.uptime_secs as f64 / 3600.0),
            network_interfaces: facts.network_interfaces,
        }
    }
}

/// `host.json` 전체
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSnapshot {
    pub host_info: HostInfo,
    pub user_info: UserInfo,
}

/// 현재 프로세스 환경변수 전체 (non-UTF-8은 lossy 변환)
pub fn env_vars() -> BTreeMap<String, String> {
    std::env::vars_os()
        .map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect()
}

/// 환경변수 스냅샷 쓰기
pub async fn write_env_vars(path: &Path) -> Result<()> {
    let vars = env_vars();
    debug!(count = vars.len(), path = %path.display(), "Writing environment snapshot");
    write_json_pretty(path, &vars).await
}

/// 머신/사용자 정보 수집 후 쓰기
pub async fn gather_host_info_and_write(path: &Path) -> Result<()> {
    // sysinfo 수집은 블로킹
    let snapshot = tokio::task::spawn_blocking(|| HostSnapshot {
        host_info: HostInfo::from_facts(HostFacts::detect()),
        user_info: UserInfo::detect(),
    })
    .await
    .map_err(|e| aos_foundation::Error::Internal(format!("host info task failed: {}", e)))?;

    debug!(hostname = %snapshot.host_info.hostname, path = %path.display(), "Writing host snapshot");
    write_json_pretty(path, &snapshot).await
}

/// 워크스페이스 폴더 목록 쓰기 (열린 폴더가 없으면 `null`)
pub async fn log_workspace_folders(folders: Option<&[WorkspaceFolder]>, path: &Path) -> Result<()> {
    write_json_pretty(path, &folders).await
}
