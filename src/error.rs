use thiserror::Error;

/// Unified error type for the credgate library.
#[derive(Debug, Error)]
pub enum CredGateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Environment variable not set: {0}")]
    ConfigEnvVar(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Normalization error: {0}")]
    Normalization(String),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("Origin error: {0}")]
    Origin(String),
}

pub type Result<T> = std::result::Result<T, CredGateError>;
