//! Error types for the Quire core library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types for Quire.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration loading, parsing or validation error.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A configured directory does not exist or is not a directory.
    #[error("The {role} directory '{}' is invalid", path.display())]
    InvalidDirectory { role: &'static str, path: PathBuf },

    /// File system I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic configuration crate error.
    #[error("Config crate error: {0}")]
    ConfigCrate(#[from] config::ConfigError),
}

impl CoreError {
    /// Create a new configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-directory error for the given role ("template", "output", ...).
    pub fn invalid_directory(role: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::InvalidDirectory {
            role,
            path: path.into(),
        }
    }
}
