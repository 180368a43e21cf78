//! Errors for composition-root operations.
//!
//! Producers never see these: `MessageRelay::deliver` has no failure path.

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Shared relay already installed")]
    AlreadyInstalled,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
