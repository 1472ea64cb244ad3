//! Quire Core Library
//!
//! Configuration, path classification and error handling for the Quire static
//! site generator.

pub mod classify;
pub mod config;
pub mod error;

pub use classify::{Category, PathClassifier, is_within, relative_slash_path};
pub use config::Config;
pub use error::{CoreError, Result};
