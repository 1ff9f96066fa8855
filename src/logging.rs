//! Logging setup on top of `tracing` and `tracing-subscriber`.
//!
//! Log levels used by the engine:
//!
//! - `error`: failed submissions, missing prerequisite steps
//! - `warn`: submissions still pending when the session ends
//! - `info`: step transitions and session lifecycle
//! - `debug`: validation summaries, store writes, dispatched submissions
//! - `trace`: individual field changes
//!
//! Field values are personal data (CPF, phone). They are only logged through
//! [`redact_value`], which hides them unless `log_data` is enabled.

use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder used when value logging is disabled.
pub const REDACTED_VALUE: &str = "[REDACTED]";

pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Relaxed)
}

/// Returns `value` when value logging is enabled, otherwise a redacted token.
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub with_target: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Whether field values may appear in logs.
    pub log_data: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            with_target: false,
            with_ansi: true,
            format: LogFormat::default(),
            log_data: false,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }

    #[must_use]
    pub fn with_log_data(mut self, enable: bool) -> Self {
        self.log_data = enable;
        self
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    LOG_DATA_ENABLED.store(config.log_data, Ordering::Release);
    let filter = build_env_filter(config.level);

    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(config.with_target),
            )
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_ansi(config.with_ansi)
                    .with_target(config.with_target)
                    .without_time(),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(config.with_ansi)
                    .with_target(config.with_target)
                    .without_time(),
            )
            .try_init(),
    }
}

/// `RUST_LOG` wins over the configured level.
fn build_env_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,stepform={level}")))
}

#[cfg(test)]
mod tests {
    use super::{LOG_DATA_ENABLED, REDACTED_VALUE, redact_value};
    use std::sync::atomic::Ordering;

    #[test]
    fn redacts_unless_enabled() {
        LOG_DATA_ENABLED.store(false, Ordering::Release);
        assert_eq!(redact_value("529.982.247-25"), REDACTED_VALUE);

        LOG_DATA_ENABLED.store(true, Ordering::Release);
        assert_eq!(redact_value("529.982.247-25"), "529.982.247-25");
        LOG_DATA_ENABLED.store(false, Ordering::Release);
    }
}
