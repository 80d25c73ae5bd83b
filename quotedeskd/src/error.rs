//! Daemon error types.

use quotedesk_engine::EngineError;
use thiserror::Error;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Engine error
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// JSON rendering failed
    #[error("Render error: {0}")]
    Render(#[from] serde_json::Error),

    /// Terminal I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A background task did not stop cleanly
    #[error("Shutdown error: {0}")]
    Shutdown(String),
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
