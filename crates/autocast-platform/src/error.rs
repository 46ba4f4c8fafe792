//! Common error types for autocast-platform.

use autocast_core::PortError;
use thiserror::Error;

/// Platform-level errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("injection failed: {0}")]
    InjectionFailed(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("window not found: {0}")]
    WindowNotFound(String),
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

impl From<PlatformError> for PortError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::InjectionFailed(msg) => PortError::Injection(msg),
            PlatformError::InvalidKey(key) => PortError::InvalidKey(key),
            PlatformError::WindowNotFound(what) => PortError::Unavailable(what),
        }
    }
}
