//! Tracing setup

use std::str::FromStr;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global subscriber from the logging config.
///
/// `RUST_LOG` takes precedence over the configured level. An unknown format
/// falls back to text with a warning. Fails if a global subscriber is
/// already installed, so embedding binaries keep their own.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TryInitError> {
    let (format, unknown) = match config.format.parse::<LogFormat>() {
        Ok(format) => (format, None),
        Err(reason) => (LogFormat::Text, Some(reason)),
    };

    let registry = tracing_subscriber::registry().with(env_filter(config));
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init()?,
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
    }

    if let Some(reason) = unknown {
        tracing::warn!(%reason, "Falling back to text logs");
    }
    tracing::debug!(?format, level = %config.level, "Tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" text ".parse::<LogFormat>(), Ok(LogFormat::Text));
        assert_eq!("".parse::<LogFormat>(), Ok(LogFormat::Text));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn second_initialization_is_an_error() {
        let config = LoggingConfig {
            level: "debug".into(),
            format: "yaml".into(),
        };
        // The first call may already lose to another test's subscriber.
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
