//! QuotePilot error type.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, QuotePilotError>;

/// All errors surfaced by QuotePilot subsystems.
#[derive(Debug, Error)]
pub enum QuotePilotError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Plan upgrade required: {0}")]
    Entitlement(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("API key missing for {0}")]
    ApiKeyMissing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
