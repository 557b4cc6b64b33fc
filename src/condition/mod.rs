//! Leaf-level validators
//!
//! A condition is a pure function `(value) -> Verdict`. Field schemas hold
//! an ordered list of them; the first failing one decides the field's error.

mod library;

pub use library::{
    date, email, equal_to, exclusive_in_between, greater_than, inclusive_in_between, integer,
    length_equal_to, length_greater_than, length_less_than, less_than, numeric, required, time,
    url,
};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of one condition check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub ok: bool,
    pub message: String,
}

impl Verdict {
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }

    /// `ok` decides; the message is kept either way so callers can show hints.
    pub fn check(ok: bool, message: impl Into<String>) -> Self {
        Self {
            ok,
            message: message.into(),
        }
    }
}

type CheckFn = dyn Fn(&Value) -> Verdict + Send + Sync;

/// A named, shareable validator.
///
/// Must be pure: it is re-run on every edit that touches its field.
#[derive(Clone)]
pub struct Condition {
    name: Arc<str>,
    check: Arc<CheckFn>,
}

impl Condition {
    pub fn new(
        name: impl Into<Arc<str>>,
        check: impl Fn(&Value) -> Verdict + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self, value: &Value) -> Verdict {
        (self.check)(value)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Condition").field(&self.name).finish()
    }
}

/// Runs `conditions` in order and returns the first failure's message.
pub fn first_failure(conditions: &[Condition], value: &Value) -> Option<String> {
    conditions
        .iter()
        .map(|condition| condition.check(value))
        .find(|verdict| !verdict.ok)
        .map(|verdict| verdict.message)
}
