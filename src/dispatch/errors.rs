//! Dispatch configuration errors
//!
//! These never reach the host: the element logs them and keeps its own props.

use thiserror::Error;

use super::kind::ElementKind;
use crate::error::FaramErrorCode;
use crate::observability::Event;

pub type DispatchResult<T> = Result<T, DispatchError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("{scope} scope has no handler for element kind '{kind}'")]
    UnregisteredKind {
        scope: &'static str,
        kind: ElementKind,
    },

    #[error("element of kind '{kind}' needs an element name")]
    MissingElementName { kind: ElementKind },

    #[error("element name '{name}' is not a list index")]
    InvalidIndex { name: String },

    #[error("action element '{name}' has no action attached")]
    MissingAction { name: String },

    #[error("{scope} scope does not support the '{action}' action")]
    UnsupportedAction {
        scope: &'static str,
        action: &'static str,
    },
}

impl DispatchError {
    pub fn code(&self) -> FaramErrorCode {
        FaramErrorCode::ConfigurationError
    }

    /// Event the element logs when it falls back to its own props.
    pub fn event(&self) -> Event {
        match self {
            DispatchError::UnregisteredKind { .. } => Event::DispatchUnregisteredKind,
            _ => Event::DispatchRejected,
        }
    }
}
