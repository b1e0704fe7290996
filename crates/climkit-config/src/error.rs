//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or validating hub configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("integration name '{0}' is used more than once")]
    DuplicateIntegration(String),

    #[error("poll_interval must be at least 1 second (integration '{0}')")]
    InvalidPollInterval(String),

    #[error("invalid options for integration '{name}': {source}")]
    InvalidOptions {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
