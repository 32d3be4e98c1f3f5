//! Error types for GrihaNav

use thiserror::Error;

/// GrihaNav error type
#[derive(Error, Debug)]
pub enum GrihaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Grid error: {0}")]
    Grid(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Agent error: {0}")]
    Agent(String),
}

impl From<serde_json::Error> for GrihaError {
    fn from(e: serde_json::Error) -> Self {
        GrihaError::Registry(e.to_string())
    }
}

impl From<toml::de::Error> for GrihaError {
    fn from(e: toml::de::Error) -> Self {
        GrihaError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GrihaError>;
