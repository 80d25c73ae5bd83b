//! Engine error types.

use thiserror::Error;

/// Engine-level errors.
///
/// Only configuration can fail; sizing and depth generation report
/// insufficient or degenerate input through their return values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Generator or source configured with unusable parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
