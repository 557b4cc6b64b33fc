//! Submission: full validation, then either the error tree or both value
//! variants go to the host

use serde_json::Value;

use crate::accumulator::{accumulate_errors, accumulate_values, analyze_errors, ValueSettings};
use crate::error::FaramErrorCode;
use crate::observability::ObservationScope;
use crate::schema::SchemaNode;
use crate::tree::ErrorTree;

/// Receives the result of a submit.
pub trait SubmitHost {
    /// Some field or node failed; the value tree is left as it was.
    fn on_validation_failure(&self, errors: &ErrorTree);

    /// `values` keeps every position (falsy leaves as `null`); `compact`
    /// leaves falsy leaves and empty containers out.
    fn on_validation_success(&self, values: &Value, compact: &Value);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Blocked(ErrorTree),
    Accepted { values: Value, compact: Value },
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }

    pub fn code(&self) -> Option<FaramErrorCode> {
        match self {
            SubmitOutcome::Blocked(_) => Some(FaramErrorCode::SubmissionBlocked),
            SubmitOutcome::Accepted { .. } => None,
        }
    }
}

/// Validates the whole tree, never just the changed part.
pub fn validate_submission(value: &Value, schema: &SchemaNode) -> SubmitOutcome {
    let errors = accumulate_errors(value, schema);
    if analyze_errors(&errors) {
        return SubmitOutcome::Blocked(errors);
    }
    SubmitOutcome::Accepted {
        values: accumulate_values(value, schema, &ValueSettings::explicit_null()),
        compact: accumulate_values(value, schema, &ValueSettings::compact()),
    }
}

/// Submits a standalone `value`/`schema` pair right away, for sub-forms
/// that are not mounted under a `Form`.
pub fn detached_submit<H: SubmitHost + ?Sized>(
    value: &Value,
    schema: &SchemaNode,
    host: &H,
) -> SubmitOutcome {
    let scope = ObservationScope::with_fields("SUBMIT", &[("mode", "detached")]);
    let outcome = validate_submission(value, schema);
    deliver(&outcome, host);
    finish(scope, &outcome);
    outcome
}

pub(super) fn deliver<H: SubmitHost + ?Sized>(outcome: &SubmitOutcome, host: &H) {
    match outcome {
        SubmitOutcome::Blocked(errors) => host.on_validation_failure(errors),
        SubmitOutcome::Accepted { values, compact } => host.on_validation_success(values, compact),
    }
}

pub(super) fn finish(scope: ObservationScope<'_>, outcome: &SubmitOutcome) {
    match outcome.code() {
        Some(code) => scope.complete_with_fields(&[("outcome", "blocked"), ("code", code.code())]),
        None => scope.complete_with_fields(&[("outcome", "accepted")]),
    }
}
