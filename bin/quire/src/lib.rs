//! Quire CLI Library
//!
//! Command implementations and shared setup for the `quire` binary.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, watch, check)
//!
//! # Example
//!
//! ```no_run
//! use quire::cmd::{self, SiteArgs};
//!
//! let config = cmd::load_config(None, &SiteArgs::default()).unwrap();
//! cmd::build::run(config).unwrap();
//! ```

pub mod cmd;

// Re-export core types for convenience
pub use quire_core::{Category, Config, PathClassifier};
pub use quire_generator::{BuildStats, ChangeWatcher, SiteBuilder};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
