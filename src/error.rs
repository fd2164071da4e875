//! Error types for Gear
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Gear
#[derive(Debug, Error)]
pub enum GearError {
    /// Task prefix is not one of `shell`, `gui`, `web`
    #[error("Unknown task kind: {0}")]
    UnknownTaskKind(String),

    /// Task text is structurally broken (missing action, empty command)
    #[error("Malformed task: {0}")]
    MalformedTask(String),

    /// GUI/Web parameter payload is not a JSON object
    #[error("Error parsing {kind} parameters (JSON): {message}")]
    ParameterParse { kind: String, message: String },

    /// Action name not present in the GUI or Web action table
    #[error("Unsupported {surface} action: {action}")]
    UnsupportedAction { surface: &'static str, action: String },

    /// Parameters parsed but do not fit the named action
    #[error("Invalid parameters for {action}: {message}")]
    InvalidParameters { action: String, message: String },

    /// Knowledge or episodic store failure
    #[error("Store error: {0}")]
    Store(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Gear operations
pub type Result<T> = std::result::Result<T, GearError>;
