//! Configuration module
//!
//! Settings are read from a TOML file, by default
//! `~/.config/emobility-core/config.toml`. Every section and key is
//! optional; anything left out takes its default.
//!
//! ```toml
//! [ledger]
//! max_history_size = 50
//!
//! [projection]
//! history_size = 1
//!
//! [push]
//! sender_id = "emobility-core"
//! timeout_ms = 30000
//! lock_wait_ms = 5000
//!
//! [push.retry]
//! max_attempts = 3
//! initial_delay_ms = 200
//! backoff_multiplier = 2.0
//! max_delay_ms = 5000
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::PushConfig;
use crate::domain::status::{
    ProjectionOptions, DEFAULT_MAX_HISTORY_SIZE, DEFAULT_PROJECTION_HISTORY_SIZE,
};
use crate::shared::errors::ConfigError;
use crate::shared::types::Paging;
use crate::shared::utils::RetryConfig;

const APP_DIR: &str = "emobility-core";
const CONFIG_FILE: &str = "config.toml";

/// Default config location: `<config dir>/emobility-core/config.toml`,
/// falling back to the working directory when no config dir is known.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ledger: LedgerConfig,
    pub projection: ProjectionConfig,
    pub push: PushSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Entries kept per status history (at least 1)
    pub max_history_size: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub history_size: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_PROJECTION_HISTORY_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushSettings {
    pub sender_id: String,
    pub timeout_ms: u64,
    pub lock_wait_ms: u64,
    pub retry: RetrySettings,
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            sender_id: APP_DIR.to_string(),
            timeout_ms: 30_000,
            lock_wait_ms: 5_000,
            retry: RetrySettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 200,
            backoff_multiplier: 2.0,
            max_delay_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `emobility_core=debug`
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot drive the push pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let multiplier = self.push.retry.backoff_multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(ConfigError::Invalid {
                key: "push.retry.backoff_multiplier",
                reason: format!("must be a finite number >= 1.0, got {}", multiplier),
            });
        }
        if self.push.retry.max_delay_ms < self.push.retry.initial_delay_ms {
            return Err(ConfigError::Invalid {
                key: "push.retry.max_delay_ms",
                reason: format!(
                    "must not be below initial_delay_ms ({})",
                    self.push.retry.initial_delay_ms
                ),
            });
        }
        Ok(())
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn max_history_size(&self) -> usize {
        self.ledger.max_history_size.max(1)
    }

    pub fn projection_options(&self, paging: Paging) -> ProjectionOptions {
        ProjectionOptions {
            paging,
            history_size: self.projection.history_size,
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            backoff_multiplier: settings.backoff_multiplier,
            max_delay: Duration::from_millis(settings.max_delay_ms),
        }
    }
}

impl From<&PushSettings> for PushConfig {
    fn from(settings: &PushSettings) -> Self {
        Self {
            timeout: Duration::from_millis(settings.timeout_ms),
            lock_wait: Duration::from_millis(settings.lock_wait_ms),
            retry: RetryConfig::from(&settings.retry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::from_toml("").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.ledger.max_history_size, 50);
        assert_eq!(config.projection.history_size, 1);
        assert_eq!(config.push.timeout_ms, 30_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [push]
            sender_id = "hub-1"

            [push.retry]
            max_attempts = 5

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.push.sender_id, "hub-1");
        assert_eq!(config.push.lock_wait_ms, 5_000);
        assert_eq!(config.push.retry.max_attempts, 5);
        assert_eq!(config.push.retry.initial_delay_ms, 200);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let err = AppConfig::from_toml("[ledger]\nmax_history_size = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn negative_backoff_multiplier_is_rejected() {
        let err = AppConfig::from_toml("[push.retry]\nbackoff_multiplier = -2.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "push.retry.backoff_multiplier", .. }
        ));

        let err = AppConfig::from_toml("[push.retry]\nbackoff_multiplier = nan").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        assert!(AppConfig::from_toml("[push.retry]\nbackoff_multiplier = 1.0").is_ok());
    }

    #[test]
    fn max_delay_below_initial_delay_is_rejected() {
        let err = AppConfig::from_toml("[push.retry]\ninitial_delay_ms = 500\nmax_delay_ms = 100")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "push.retry.max_delay_ms", .. }));
    }

    #[test]
    fn invalid_file_fails_to_load() {
        let dir = std::env::temp_dir().join(format!("emobility-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "[push.retry]\nbackoff_multiplier = -2.0\n").unwrap();

        let result = AppConfig::load(&path);
        fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join(format!("missing-{}.toml", uuid::Uuid::new_v4()));
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = std::env::temp_dir().join(format!("emobility-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");
        let mut config = AppConfig::default();
        config.ledger.max_history_size = 7;
        config.push.sender_id = "hub-2".into();

        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn durations_convert_from_milliseconds() {
        let mut config = AppConfig::default();
        config.push.timeout_ms = 1_500;
        config.ledger.max_history_size = 0;

        let push = PushConfig::from(&config.push);

        assert_eq!(push.timeout, Duration::from_millis(1_500));
        assert_eq!(push.lock_wait, Duration::from_secs(5));
        assert_eq!(push.retry.max_delay, Duration::from_secs(5));
        assert_eq!(config.max_history_size(), 1);
        assert_eq!(config.projection_options(Paging::default()).history_size, 1);
    }

    #[test]
    fn default_path_ends_in_app_dir() {
        let path = default_config_path();
        assert!(path.ends_with("config.toml"));
    }
}
