//! Observable events of the form engine
//!
//! Events are explicit and typed. Each carries a default severity.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Root controller lifecycle
    /// Form mounted and initial derivation ran
    FormMounted,
    /// Form torn down, pending timers cancelled
    FormTeardown,

    // Computer
    /// Derived fields changed the value tree
    ComputeApplied,
    /// Derivation hit the iteration cap and kept the last tree
    ComputeDiverged,

    // Dispatch
    /// A leaf asked for a kind its scope does not handle
    DispatchUnregisteredKind,
    /// A scope could not serve a leaf (missing name, wrong slice shape)
    DispatchRejected,

    // Submission
    /// Submit scheduled behind the change delay
    SubmitScheduled,
    /// A pending submit was replaced by a newer one
    SubmitSuperseded,

    // Schemas
    /// Declarative schema parsed
    SchemaLoaded,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::FormMounted => "FORM_MOUNTED",
            Event::FormTeardown => "FORM_TEARDOWN",
            Event::ComputeApplied => "COMPUTE_APPLIED",
            Event::ComputeDiverged => "COMPUTE_DIVERGED",
            Event::DispatchUnregisteredKind => "DISPATCH_UNREGISTERED_KIND",
            Event::DispatchRejected => "DISPATCH_REJECTED",
            Event::SubmitScheduled => "SUBMIT_SCHEDULED",
            Event::SubmitSuperseded => "SUBMIT_SUPERSEDED",
            Event::SchemaLoaded => "SCHEMA_LOADED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Event::ComputeDiverged | Event::DispatchUnregisteredKind | Event::DispatchRejected => {
                Severity::Warn
            }
            Event::FormMounted | Event::FormTeardown | Event::SchemaLoaded => Severity::Info,
            Event::ComputeApplied | Event::SubmitScheduled | Event::SubmitSuperseded => {
                Severity::Trace
            }
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
