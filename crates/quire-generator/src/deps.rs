//! Dependency resolution for partial rebuilds.

use quire_core::{Category, PathClassifier};

/// Artifacts that must be re-rendered after a source path changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencySet {
    /// Every page: a module may be included by any of them.
    AllPages,
    /// The single page at this path.
    Page(String),
    /// The single static file at this path.
    Static(String),
    /// The single document at this path.
    Document(String),
    /// Nothing depends on the path (private files).
    Nothing,
}

impl DependencySet {
    /// Resolve the dependency set of a changed source-relative path.
    #[must_use]
    pub fn resolve(classifier: &PathClassifier, path: &str) -> Self {
        match classifier.classify(path) {
            Category::Module => Self::AllPages,
            Category::Page => Self::Page(path.to_string()),
            Category::Static => Self::Static(path.to_string()),
            Category::Document => Self::Document(path.to_string()),
            Category::Private => Self::Nothing,
        }
    }
}
