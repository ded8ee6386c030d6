//! Error types for Vitrine.

use std::io;

/// Errors produced by the Vitrine page model and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum VitrineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, VitrineError>;
