//! Error types for writerdeck.

use std::io;

/// Errors produced by the writerdeck crates.
#[derive(Debug, thiserror::Error)]
pub enum WriterdeckError {
    #[error("config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("bluetooth error: {0}")]
    Bluetooth(String),

    #[error("D-Bus error: {0}")]
    DBus(String),

    #[error("platform error: {0}")]
    Platform(String),

    #[error("state error: {0}")]
    State(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, WriterdeckError>;
