//! Progress logging on top of `tracing`.
//!
//! Events go to stderr so that XML printed on stdout stays clean. The
//! filter comes from `M2M_LOG` (full `EnvFilter` directives) when set,
//! otherwise from the configured level.

use std::fmt::Display;
use std::str::FromStr;

use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::error::ConfigError;

/// Environment variable holding raw filter directives, e.g. `m2m=debug`
pub const LOG_FILTER_VAR: &str = "M2M_LOG";

/// Default level when nothing is configured
pub const DEFAULT_LEVEL: &str = "info";

/// How events are rendered on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(s.to_string()),
        }
    }
}

/// Map a user-facing level name to a filter level.
///
/// `warning` and `success` are accepted for `warn` and `info`.
pub fn normalize_level(value: &str) -> Option<&'static str> {
    match value.trim().to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" | "success" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" => Some("error"),
        "off" => Some("off"),
        _ => None,
    }
}

/// Build the event filter, preferring `M2M_LOG` directives.
pub fn build_env_filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_FILTER_VAR) {
        return filter;
    }
    if level == "off" {
        return EnvFilter::new("off");
    }
    EnvFilter::new(format!("m2m={}", level))
}

/// Install the global subscriber writing to stderr.
pub fn init_logging(level: &str, format: LogFormat) -> Result<(), ConfigError> {
    let base_subscriber = Registry::default().with(build_env_filter(level));

    let result = match format {
        LogFormat::Json => base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => base_subscriber
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| ConfigError::Logging(e.to_string()))
}

pub fn log_info(msg: impl Display) {
    tracing::info!("{}", msg);
}

/// A completed step; logged at info level with `status = "success"`
pub fn log_success(msg: impl Display) {
    tracing::info!(status = "success", "{}", msg);
}

pub fn log_warning(msg: impl Display) {
    tracing::warn!("{}", msg);
}
