use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by credential providers and credential storage.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("no credentials stored for profile '{0}'")]
    MissingProfile(String),
    #[error("no credentials found in the environment (set {0})")]
    MissingEnvironment(&'static str),
    #[error("invalid header set in {0}: expected a JSON object of strings")]
    InvalidHeaderSet(&'static str),
    #[error("access token is empty")]
    EmptyToken,
}
