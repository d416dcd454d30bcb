//! Error types for CLI operations.

use contracts::ContractError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Trace file not found
    #[error("Trace file not found: {path}")]
    TraceNotFound { path: String },

    /// Trace decoding, synchronizer construction or routing error
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Emission output could not be written
    #[error("Failed to write emission: {0}")]
    Output(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn trace_not_found(path: impl Into<String>) -> Self {
        Self::TraceNotFound { path: path.into() }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
