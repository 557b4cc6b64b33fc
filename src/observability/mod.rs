//! Observability for the form engine
//!
//! - Structured logging (one JSON object per line, stderr)
//! - Typed lifecycle and diagnostic events
//! - Begin/complete scopes around submissions
//!
//! Observability is read-only: nothing here changes engine behavior, and
//! diagnostics (divergence, dispatch misconfiguration) are logged instead
//! of being raised.

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{min_severity, Logger, Severity, LOG_LEVEL_ENV};
pub use scope::ObservationScope;

/// Log an event at its default severity.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
