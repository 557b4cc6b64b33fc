//! Error taxonomy of the form engine
//!
//! Codes:
//! - FARAM_VALIDATION_FAILED (leaf message from a failing condition)
//! - FARAM_INTERNAL_ERROR (node-level `$internal` message)
//! - FARAM_COMPUTE_DIVERGED (derivation hit the iteration cap)
//! - FARAM_CONFIGURATION_ERROR (dispatch or schema misconfiguration)
//! - FARAM_SUBMISSION_BLOCKED (submit found errors)
//!
//! Validation, internal and blocked-submission errors travel as data in
//! the error tree. Divergence and configuration errors are logged only.

use std::fmt;

use crate::observability::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaramErrorCode {
    ValidationFailed,
    InternalError,
    ComputeDiverged,
    ConfigurationError,
    SubmissionBlocked,
}

impl FaramErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            FaramErrorCode::ValidationFailed => "FARAM_VALIDATION_FAILED",
            FaramErrorCode::InternalError => "FARAM_INTERNAL_ERROR",
            FaramErrorCode::ComputeDiverged => "FARAM_COMPUTE_DIVERGED",
            FaramErrorCode::ConfigurationError => "FARAM_CONFIGURATION_ERROR",
            FaramErrorCode::SubmissionBlocked => "FARAM_SUBMISSION_BLOCKED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FaramErrorCode::ComputeDiverged | FaramErrorCode::ConfigurationError => Severity::Warn,
            _ => Severity::Info,
        }
    }

    /// Whether the error reaches the user through the error tree.
    pub fn is_surfaced(&self) -> bool {
        !matches!(
            self,
            FaramErrorCode::ComputeDiverged | FaramErrorCode::ConfigurationError
        )
    }
}

impl fmt::Display for FaramErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
