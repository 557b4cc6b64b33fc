//! Schema loading errors
//!
//! Every variant is a configuration error: a schema that cannot be built
//! never reaches the engine.

use thiserror::Error;

use crate::error::FaramErrorCode;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown condition '{name}' at {path}")]
    UnknownCondition { name: String, path: String },

    #[error("invalid arguments for condition '{name}' at {path}: {reason}")]
    InvalidArguments {
        name: String,
        path: String,
        reason: String,
    },

    #[error("malformed schema at {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("condition '{0}' is already registered")]
    DuplicateCondition(String),

    #[error("failed to read schema file '{path}': {reason}")]
    Io { path: String, reason: String },
}

impl SchemaError {
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> FaramErrorCode {
        FaramErrorCode::ConfigurationError
    }

    /// Schema path the error points at, when there is one.
    pub fn path(&self) -> Option<&str> {
        match self {
            SchemaError::UnknownCondition { path, .. }
            | SchemaError::InvalidArguments { path, .. }
            | SchemaError::Malformed { path, .. }
            | SchemaError::Io { path, .. } => Some(path),
            SchemaError::DuplicateCondition(_) => None,
        }
    }
}
