//! Structured JSON line logger
//!
//! - One log line = one event
//! - `event` first, then `severity`, then fields in key order
//! - Synchronous, unbuffered, written to stderr
//! - Minimum severity read once from `FARAM_LOG`

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::sync::OnceLock;

/// Environment variable selecting the minimum logged severity
pub const LOG_LEVEL_ENV: &str = "FARAM_LOG";

static MIN_SEVERITY: OnceLock<Severity> = OnceLock::new();

thread_local! {
    static CAPTURE: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Step-by-step detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recovered or degraded behavior
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Unrecoverable
    Fatal = 4,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// Parses a level name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Some(Severity::Trace),
            "INFO" => Some(Severity::Info),
            "WARN" | "WARNING" => Some(Severity::Warn),
            "ERROR" => Some(Severity::Error),
            "FATAL" => Some(Severity::Fatal),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimum severity written to stderr (cached after first use).
pub fn min_severity() -> Severity {
    *MIN_SEVERITY.get_or_init(|| {
        std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|level| Severity::parse(&level))
            .unwrap_or(Severity::Warn)
    })
}

/// Structured logger
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields.
    ///
    /// While a capture is active on this thread every line is recorded,
    /// regardless of the configured minimum severity.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let captured = CAPTURE.with(|capture| match capture.borrow_mut().as_mut() {
            Some(lines) => {
                lines.push(Self::render(severity, event, fields));
                true
            }
            None => false,
        });
        if captured || severity < min_severity() {
            return;
        }

        let line = Self::render(severity, event, fields);
        let mut stderr = io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.write_all(b"\n");
        let _ = stderr.flush();
    }

    /// Renders one JSON object, without a trailing newline.
    pub fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(key, _)| *key);

        let mut line = String::with_capacity(64 + fields.len() * 24);
        line.push_str("{\"event\":");
        line.push_str(&quote(event));
        line.push_str(",\"severity\":\"");
        line.push_str(severity.as_str());
        line.push('"');
        for (key, value) in sorted {
            line.push(',');
            line.push_str(&quote(key));
            line.push(':');
            line.push_str(&quote(value));
        }
        line.push('}');
        line
    }

    /// Runs `f`, returning its result and every line logged on this thread meanwhile.
    pub fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
        let previous = CAPTURE.with(|capture| capture.replace(Some(Vec::new())));
        let result = f();
        let lines = CAPTURE.with(|capture| capture.replace(previous)).unwrap_or_default();
        (result, lines)
    }

    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }
}

fn quote(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}
