//! ObservationScope: begin/complete/failed logging around one operation
//!
//! - `{name}_BEGIN` at TRACE on creation
//! - `{name}_COMPLETE` at INFO on `complete()`
//! - `{name}_FAILED` at WARN on `fail()`
//! - `{name}_INCOMPLETE` at WARN if dropped unfinished

use std::cell::Cell;

use super::logger::{Logger, Severity};

pub struct ObservationScope<'a> {
    name: &'a str,
    finished: Cell<bool>,
    fields: Vec<(&'a str, String)>,
}

impl<'a> ObservationScope<'a> {
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Fields given here are repeated on the closing line.
    pub fn with_fields(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        let scope = Self {
            name,
            finished: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
        };
        scope.emit(Severity::Trace, "BEGIN", &[]);
        scope
    }

    pub fn complete(self) {
        self.finish(Severity::Info, "COMPLETE", &[]);
    }

    pub fn complete_with_fields(self, extra: &[(&str, &str)]) {
        self.finish(Severity::Info, "COMPLETE", extra);
    }

    pub fn fail(self, reason: &str) {
        self.finish(Severity::Warn, "FAILED", &[("reason", reason)]);
    }

    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    fn finish(&self, severity: Severity, suffix: &str, extra: &[(&str, &str)]) {
        self.finished.set(true);
        self.emit(severity, suffix, extra);
    }

    fn emit(&self, severity: Severity, suffix: &str, extra: &[(&str, &str)]) {
        let event = format!("{}_{}", self.name, suffix);
        let mut fields: Vec<(&str, &str)> =
            self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        fields.extend(extra.iter().copied());
        Logger::log(severity, &event, &fields);
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.finished.get() {
            self.emit(Severity::Warn, "INCOMPLETE", &[("reason", "scope dropped unfinished")]);
        }
    }
}
