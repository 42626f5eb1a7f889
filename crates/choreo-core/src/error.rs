/// Core error types for the Choreo engine.
use std::path::PathBuf;

/// A specialized Result type for Choreo operations.
pub type ChoreoResult<T> = Result<T, ChoreoError>;

/// Top-level error type encompassing every engine failure.
///
/// None of these are transient: they all stem from inconsistent
/// caller-supplied data and are never retried.
#[derive(Debug, thiserror::Error)]
pub enum ChoreoError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("duplicate id: '{0}' is already registered")]
    DuplicateId(String),

    #[error("unknown element: '{0}'")]
    UnknownElement(String),

    #[error("unresolved reference: '{reference}' has not been positioned yet")]
    UnresolvedReference { reference: String },

    #[error("empty group '{group}': {reason}")]
    EmptyGroup { group: String, reason: String },

    #[error("sequence is closed; no further steps may be submitted")]
    SequenceClosed,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("config file error: {message} ({path:?})")]
    Config { message: String, path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChoreoError {
    /// Create an unresolved-reference error.
    pub fn unresolved(reference: impl Into<String>) -> Self {
        ChoreoError::UnresolvedReference {
            reference: reference.into(),
        }
    }

    /// Create an empty-group error.
    pub fn empty_group(group: impl Into<String>, reason: impl Into<String>) -> Self {
        ChoreoError::EmptyGroup {
            group: group.into(),
            reason: reason.into(),
        }
    }

    /// Create a config file error.
    pub fn config(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ChoreoError::Config {
            message: message.into(),
            path: path.into(),
        }
    }
}
