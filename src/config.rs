//! Wizard configuration loaded from YAML.
//!
//! ```yaml
//! steps: [STUDENT_ID, PERSONAL_DETAILS, ADDRESS]
//! drain_timeout_ms: 5000
//! logging:
//!   level: debug
//!   format: compact
//! ```

use crate::core::StepKey;
use crate::error::ConfigError;
use crate::logging::{LogConfig, LogFormat};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

const DEFAULT_DRAIN_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WizardConfig {
    pub steps: Vec<StepKey>,
    /// How long ending a session waits for outstanding submissions.
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub log_data: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            log_data: false,
        }
    }
}

fn default_drain_timeout_ms() -> u64 {
    DEFAULT_DRAIN_TIMEOUT_MS
}

fn default_level() -> String {
    "info".to_string()
}

impl WizardConfig {
    pub fn new(steps: Vec<StepKey>) -> Self {
        Self {
            steps,
            drain_timeout_ms: DEFAULT_DRAIN_TIMEOUT_MS,
            logging: LoggingSection::default(),
        }
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(input)?;
        config.check()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&input)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    pub fn log_config(&self) -> Result<LogConfig, ConfigError> {
        let level = Level::from_str(self.logging.level.trim())
            .map_err(|_| ConfigError::InvalidLevel(self.logging.level.clone()))?;
        Ok(LogConfig::default()
            .with_level(level)
            .with_format(self.logging.format)
            .with_log_data(self.logging.log_data))
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.steps.is_empty() {
            return Err(ConfigError::EmptyFlow);
        }
        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.as_str()) {
                return Err(ConfigError::DuplicateStep(step.clone()));
            }
        }
        Ok(())
    }
}
