//! Quire Generator Library
//!
//! Site build engine for Quire.
//!
//! # Modules
//!
//! - [`template`] - Jinja template engine and renderables
//! - [`documents`] - Document discovery and output layout
//! - [`assets`] - Static file copying
//! - [`deps`] - Dependency sets for partial rebuilds
//! - [`build`] - Full and partial build orchestration
//! - [`watch`] - Mapping filesystem changes to partial builds

pub mod assets;
pub mod build;
pub mod deps;
pub mod documents;
pub mod template;
pub mod watch;

pub use assets::AssetCopier;
pub use build::{BuildError, BuildStats, PartialOutcome, SiteBuilder};
pub use deps::DependencySet;
pub use template::{PageTemplate, Renderable, TemplateEngine, WrappedDocument};
pub use watch::{ChangeEvent, ChangeKind, ChangeWatcher};
