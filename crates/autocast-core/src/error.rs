//! Error types for the execution engine and its ports.

use thiserror::Error;

/// Failure reported by a window or input port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PortError {
    #[error("injection failed: {0}")]
    Injection(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
}

/// Engine errors.
///
/// `Configuration` is returned synchronously from `Engine::start`. The other
/// variants end a running session and reach the controller as a single
/// `EngineEvent::Error`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("target window lost: {0}")]
    WindowLost(String),
    #[error("input error: {0}")]
    Injection(String),
    #[error("a session is already running")]
    AlreadyRunning,
    #[error("engine worker failed: {0}")]
    Worker(String),
}

impl From<PortError> for EngineError {
    fn from(err: PortError) -> Self {
        Self::Injection(err.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
