//! Change handling for watch mode.
//!
//! The filesystem subscription itself lives in the CLI; this module decides
//! which notifications matter and turns each one into a partial build.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use quire_core::relative_slash_path;
use tracing::{debug, error, info};

use crate::build::{PartialOutcome, Result, SiteBuilder};

/// Kind of filesystem change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A file appeared.
    Created,
    /// A file's contents or metadata changed.
    Modified,
    /// A file went away.
    Deleted,
    /// Anything else (access, unknown).
    Other,
}

impl ChangeKind {
    /// Lowercase display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Other => "other",
        }
    }
}

/// One filesystem notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

impl ChangeEvent {
    /// Create an event.
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Maps change events to partial builds.
#[derive(Debug, Clone)]
pub struct ChangeWatcher {
    builder: Arc<SiteBuilder>,
    roots: Vec<PathBuf>,
}

impl ChangeWatcher {
    /// Create a watcher for the builder's source directory.
    pub fn new(builder: Arc<SiteBuilder>) -> Self {
        let source = builder.source_dir().to_path_buf();
        let mut roots = Vec::new();
        if let Ok(canonical) = source.canonicalize() {
            roots.push(canonical);
        }
        if source.is_relative()
            && let Ok(cwd) = std::env::current_dir()
        {
            roots.push(cwd.join(&source));
        }
        roots.push(source);
        roots.dedup();
        Self { builder, roots }
    }

    /// Directory to subscribe to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.roots[0]
    }

    /// The builder partial builds run on.
    #[must_use]
    pub fn builder(&self) -> &SiteBuilder {
        &self.builder
    }

    /// The source-relative path of a qualifying event.
    ///
    /// An event qualifies when it is a creation or modification of a regular
    /// file under the source root, outside the output directory.
    #[must_use]
    pub fn qualify(&self, event: &ChangeEvent) -> Option<String> {
        if !matches!(event.kind, ChangeKind::Created | ChangeKind::Modified) {
            return None;
        }
        if !event.path.is_file() {
            return None;
        }
        let relative = self
            .roots
            .iter()
            .find_map(|root| relative_slash_path(root, &event.path))?;
        (!self.builder.is_output(&relative)).then_some(relative)
    }

    /// Run the partial build for an event. Non-qualifying events yield `None`.
    pub fn handle(&self, event: &ChangeEvent) -> Result<Option<PartialOutcome>> {
        let Some(relative) = self.qualify(event) else {
            debug!(kind = event.kind.as_str(), path = %event.path.display(), "ignoring event");
            return Ok(None);
        };

        info!(kind = event.kind.as_str(), path = %relative, "source changed");
        self.builder.rebuild(&relative).map(Some)
    }

    /// Like [`handle`](Self::handle), but a failed rebuild is logged and
    /// swallowed so the watch session keeps going.
    pub fn process(&self, event: &ChangeEvent) -> Option<PartialOutcome> {
        match self.handle(event) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(path = %event.path.display(), error = %e, "rebuild failed");
                None
            }
        }
    }
}
