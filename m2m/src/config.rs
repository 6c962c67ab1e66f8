//! Settings read from the environment (and an optional `.env` file).
//!
//! | Variable | Values | Default |
//! |----------|--------|---------|
//! | `M2M_LOG_LEVEL` | trace, debug, info, warn, error, off | info |
//! | `M2M_LOG_FORMAT` | text, json | text |
//! | `M2M_OUTPUT_DIR` | directory replacing every record's base directory | unset |
//! | `M2M_DELIMITER` | single character, or `tab` | `,` |
//!
//! `M2M_LOG` (raw filter directives) is read by [`crate::logs::build_env_filter`]
//! and takes precedence over `M2M_LOG_LEVEL`.

use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::logs::{normalize_level, LogFormat, DEFAULT_LEVEL};
use crate::parser::DEFAULT_DELIMITER;

pub const LOG_LEVEL_VAR: &str = "M2M_LOG_LEVEL";
pub const LOG_FORMAT_VAR: &str = "M2M_LOG_FORMAT";
pub const OUTPUT_DIR_VAR: &str = "M2M_OUTPUT_DIR";
pub const DELIMITER_VAR: &str = "M2M_DELIMITER";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Minimum level logged (`off` silences the log)
    pub log_level: &'static str,
    pub log_format: LogFormat,
    pub output_dir: Option<PathBuf>,
    pub delimiter: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LEVEL,
            log_format: LogFormat::Text,
            output_dir: None,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl Settings {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any variable lookup. Unset or blank variables
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(value) = get(LOG_LEVEL_VAR) {
            settings.log_level = parse_log_level(&value)?;
        }
        if let Some(value) = get(LOG_FORMAT_VAR) {
            settings.log_format = value.parse().map_err(|value| ConfigError::InvalidValue {
                key: LOG_FORMAT_VAR,
                value,
            })?;
        }
        if let Some(value) = get(OUTPUT_DIR_VAR) {
            settings.output_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = get(DELIMITER_VAR) {
            settings.delimiter = parse_delimiter(&value).ok_or(ConfigError::InvalidValue {
                key: DELIMITER_VAR,
                value,
            })?;
        }

        Ok(settings)
    }
}

pub fn parse_log_level(value: &str) -> Result<&'static str, ConfigError> {
    normalize_level(value).ok_or_else(|| ConfigError::InvalidValue {
        key: LOG_LEVEL_VAR,
        value: value.to_string(),
    })
}

/// A delimiter must be one ASCII character; `tab` and `\t` name the tab.
pub fn parse_delimiter(value: &str) -> Option<u8> {
    if matches!(value, "tab" | "\\t") {
        return Some(b'\t');
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Some(c as u8),
        _ => None,
    }
}
