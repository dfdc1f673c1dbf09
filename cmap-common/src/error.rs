//! Common error types for cmap

use thiserror::Error;

/// Common result type for cmap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across cmap crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML config file could not be parsed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Service payload violates the analysis result schema
    #[error("Schema violation: {0}")]
    Schema(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
