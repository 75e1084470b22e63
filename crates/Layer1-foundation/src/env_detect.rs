//! Environment Detection - 호스트 머신 정보 수집
//!
//! 태스크 감사 기록(host.json)에 들어갈 머신/사용자 정보를 감지합니다.
//! CPU/메모리/네트워크는 sysinfo, 호스트 이름은 hostname crate를 사용.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;
use sysinfo::{Networks, System};

/// 운영체제 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsType {
    Windows,
    MacOS,
    Linux,
    FreeBSD,
    Unknown,
}

impl OsType {
    pub fn detect() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOS
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "freebsd") {
            Self::FreeBSD
        } else {
            Self::Unknown
        }
    }

    /// 플랫폼 식별자 (Node.js `os.platform()` 표기와 동일)
    pub fn platform_id(&self) -> &'static str {
        match self {
            Self::Windows => "win32",
            Self::MacOS => "darwin",
            Self::Linux => "linux",
            Self::FreeBSD => "freebsd",
            Self::Unknown => std::env::consts::OS,
        }
    }
}

/// CPU 아키텍처 식별자 (Node.js `os.arch()` 표기)
pub fn arch_id() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "x64",
        "x86" => "ia32",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        other => other,
    }
}

// ============================================================================
// Network
// ============================================================================

/// 네트워크 인터페이스 주소 하나
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceAddress {
    pub address: String,
    pub netmask: String,
    /// "IPv4" | "IPv6"
    pub family: String,
    pub mac: String,
    pub internal: bool,
    pub cidr: String,
}

impl InterfaceAddress {
    pub fn new(addr: IpAddr, prefix: u8, mac: impl Into<String>) -> Self {
        let (family, netmask) = match addr {
            IpAddr::V4(_) => ("IPv4", prefix_to_netmask_v4(prefix).to_string()),
            IpAddr::V6(_) => ("IPv6", prefix_to_netmask_v6(prefix).to_string()),
        };
        Self {
            address: addr.to_string(),
            netmask,
            family: family.to_string(),
            mac: mac.into(),
            internal: addr.is_loopback(),
            cidr: format!("{}/{}", addr, prefix),
        }
    }
}

fn prefix_to_netmask_v4(prefix: u8) -> Ipv4Addr {
    let prefix = u32::from(prefix.min(32));
    let mask = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
    Ipv4Addr::from(mask)
}

fn prefix_to_netmask_v6(prefix: u8) -> Ipv6Addr {
    let prefix = u32::from(prefix.min(128));
    let mask = if prefix == 0 { 0 } else { u128::MAX << (128 - prefix) };
    Ipv6Addr::from(mask)
}

// ============================================================================
// HostFacts
// ============================================================================

/// 가공 전 머신 정보
#[derive(Debug, Clone, Default)]
pub struct HostFacts {
    pub hostname: String,
    pub platform: String,
    pub arch: String,
    pub domain_name: Option<String>,
    /// CPU별 모델명 (코어 수 = 길이)
    pub cpu_models: Vec<String>,
    pub total_memory_bytes: u64,
    pub free_memory_bytes: u64,
    pub uptime_secs: u64,
    pub network_interfaces: BTreeMap<String, Vec<InterfaceAddress>>,
}

impl HostFacts {
    /// 현재 머신 정보 감지
    pub fn detect() -> Self {
        let sys = System::new_all();

        let networks = Networks::new_with_refreshed_list();
        let mut network_interfaces = BTreeMap::new();
        for (name, data) in networks.list() {
            let mac = data.mac_address().to_string();
            let addresses = data
                .ip_networks()
                .iter()
                .map(|net| InterfaceAddress::new(net.addr, net.prefix, mac.clone()))
                .collect();
            network_interfaces.insert(name.clone(), addresses);
        }

        Self {
            hostname: hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_default(),
            platform: OsType::detect().platform_id().to_string(),
            arch: arch_id().to_string(),
            // Windows에서만 주로 설정됨
            domain_name: env::var("USERDOMAIN").ok(),
            cpu_models: sys.cpus().iter().map(|cpu| cpu.brand().to_string()).collect(),
            total_memory_bytes: sys.total_memory(),
            free_memory_bytes: sys.free_memory(),
            uptime_secs: System::uptime(),
            network_interfaces,
        }
    }
}

// ============================================================================
// UserInfo
// ============================================================================

/// OS가 보고하는 현재 사용자 (Node.js `os.userInfo()` 형태)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Unix 이외 플랫폼에서는 -1
    pub uid: i64,
    pub gid: i64,
    pub username: String,
    pub homedir: Option<PathBuf>,
    pub shell: Option<String>,
}

impl UserInfo {
    pub fn detect() -> Self {
        let (uid, gid) = current_ids();
        Self {
            uid,
            gid,
            username: env::var("USER")
                .or_else(|_| env::var("USERNAME"))
                .unwrap_or_default(),
            homedir: dirs::home_dir(),
            shell: if cfg!(unix) {
                env::var("SHELL").ok()
            } else {
                None
            },
        }
    }
}

#[cfg(unix)]
fn current_ids() -> (i64, i64) {
    // SAFETY: getuid/getgid는 항상 성공하며 부작용이 없음
    let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
    (i64::from(uid), i64::from(gid))
}

#[cfg(not(unix))]
fn current_ids() -> (i64, i64) {
    (-1, -1)
}
