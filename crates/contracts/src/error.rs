//! Layered error definitions
//!
//! Categorized by source: config / routing / payload / trace.
//!
//! Only conditions caused by external input are represented here. Timing
//! outcomes (`Dropped`, `Expired`...) are statuses, not errors.

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Routing Errors =====
    /// No stream with this name is configured
    #[error("unknown stream '{name}'")]
    UnknownStream { name: String },

    /// Sub-stream id outside the stream's fan-out
    #[error("unknown sub-stream {sub_id} for stream '{stream}' (has {available})")]
    UnknownSubStream {
        stream: String,
        sub_id: usize,
        available: usize,
    },

    // ===== Payload Errors =====
    /// Payload width does not match the stream's configured dimension
    #[error("payload for stream '{stream}' has {actual} values, expected {expected}")]
    PayloadShape {
        stream: String,
        expected: usize,
        actual: usize,
    },

    /// Trace record could not be parsed
    #[error("trace parse error at line {line}: {message}")]
    TraceParse { line: usize, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create unknown stream error
    pub fn unknown_stream(name: impl Into<String>) -> Self {
        Self::UnknownStream { name: name.into() }
    }

    /// Create trace parse error
    pub fn trace_parse(line: usize, message: impl Into<String>) -> Self {
        Self::TraceParse {
            line,
            message: message.into(),
        }
    }
}
