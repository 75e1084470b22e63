//! Error - AOS 공통 에러 타입
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// AOS 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    /// 호스트에 필수 설정이 없음 (예: 활성 API provider)
    #[error("Configuration missing: {0}")]
    ConfigMissing(String),

    // ========================================================================
    // 호스트 관련
    // ========================================================================
    #[error("Host error: {service} - {message}")]
    Host { service: String, message: String },

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    // ========================================================================
    // 파일 감시
    // ========================================================================
    #[error("Watch error: {0}")]
    Watch(String),

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 사용자에게 보여줄 수 있는 에러인지 확인
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::ConfigMissing(_)
                | Error::NotFound(_)
                | Error::TaskNotFound(_)
                | Error::InvalidInput(_)
        )
    }

    /// 파일/폴더가 없어서 발생한 에러인지 확인
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) | Error::TaskNotFound(_) => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// 호스트 서비스 에러 생성 헬퍼
    pub fn host(service: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Host {
            service: service.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
