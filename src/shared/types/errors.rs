use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid country code: {0}")]
    InvalidCountryCode(String),

    #[error("Unknown {kind} value: {value}")]
    UnknownStatus { kind: &'static str, value: String },

    #[error("Invalid change method: {0}")]
    InvalidChangeMethod(String),

    #[error("Status history of {0} is empty")]
    EmptyHistory(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Invalid projection: {0}")]
    InvalidProjection(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
