//! Error handling for the Keyboard Maestro bridge.
//!
//! Provides centralized error types using thiserror. The variants mirror the
//! failure classes of the bridge: parameter validation, external script
//! execution, post-execution verification, and output decoding.

use thiserror::Error;

/// Main error type for the bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A caller-supplied parameter is missing or malformed. Raised before
    /// any external process is spawned.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The control script process exited abnormally. The detail carries the
    /// process's own diagnostic text verbatim.
    #[error("{op} failed: {detail}")]
    Execution { op: String, detail: String },

    /// The script ran cleanly but the observable state did not change as
    /// expected. Distinct from `Execution`: the engine silently ignored
    /// the request (typically malformed action/trigger XML).
    #[error("{op} was not applied: {detail}")]
    NotApplied { op: String, detail: String },

    /// The engine produced output the decoder could not make sense of.
    #[error("Decode error: {0}")]
    Decode(String),

    /// IO errors (staging files, log files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

// Convenient error constructors
impl BridgeError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an execution error carrying the external diagnostic.
    pub fn execution(op: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Execution {
            op: op.into(),
            detail: detail.into(),
        }
    }

    /// Create a "mutation not applied" verification error.
    pub fn not_applied(op: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::NotApplied {
            op: op.into(),
            detail: detail.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}
