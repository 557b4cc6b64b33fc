//! Form configuration
//!
//! The form-wide flags a host usually keeps outside the schema, loadable
//! from a JSON file:
//!
//! ```json
//! { "disabled": false, "read_only": false, "change_delay_ms": 300 }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::FaramErrorCode;

/// Largest accepted change delay.
pub const MAX_CHANGE_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("invalid config JSON: {0}")]
    Parse(String),

    #[error("change_delay_ms must be at most {max}, got {got}")]
    ChangeDelayTooLong { got: u64, max: u64 },
}

impl ConfigError {
    pub fn code(&self) -> FaramErrorCode {
        FaramErrorCode::ConfigurationError
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub disabled: bool,

    #[serde(default)]
    pub read_only: bool,

    /// Debounce before a submit fires (0 = immediately)
    #[serde(default)]
    pub change_delay_ms: u64,
}

impl FormConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: FormConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.change_delay_ms > MAX_CHANGE_DELAY_MS {
            return Err(ConfigError::ChangeDelayTooLong {
                got: self.change_delay_ms,
                max: MAX_CHANGE_DELAY_MS,
            });
        }
        Ok(())
    }

    pub fn change_delay(&self) -> Duration {
        Duration::from_millis(self.change_delay_ms)
    }
}
