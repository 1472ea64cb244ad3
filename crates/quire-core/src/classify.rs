//! Path classification.
//!
//! Every source-relative path falls into exactly one [`Category`]. The
//! predicates are pure functions of the path and the configured directory
//! prefixes; nothing is cached.

use std::{
    fmt,
    path::{Component, Path},
};

use crate::config::Config;

/// Category of a source-relative path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// A template rendered standalone.
    Page,
    /// A template fragment (`_`-prefixed segment), only included by others.
    Module,
    /// A file copied byte-for-byte.
    Static,
    /// A marked-up file converted to HTML and wrapped in a module.
    Document,
    /// A hidden (`.`-prefixed segment) path, ignored entirely.
    Private,
}

impl Category {
    /// All categories in classification precedence order.
    pub const ALL: [Category; 5] = [
        Category::Module,
        Category::Private,
        Category::Static,
        Category::Document,
        Category::Page,
    ];

    /// Lowercase display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Module => "module",
            Self::Static => "static",
            Self::Document => "document",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies source-relative, `/`-separated paths.
#[derive(Debug, Clone, Default)]
pub struct PathClassifier {
    static_dirs: Vec<String>,
    document_dirs: Vec<String>,
}

impl PathClassifier {
    /// Create a classifier from already-normalised prefixes.
    #[must_use]
    pub fn new(static_dirs: Vec<String>, document_dirs: Vec<String>) -> Self {
        Self {
            static_dirs,
            document_dirs,
        }
    }

    /// Create a classifier for a prepared configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.build.static_dirs.clone(),
            config.documents.dirs.clone(),
        )
    }

    /// True iff any segment starts with `_`.
    #[must_use]
    pub fn is_module(&self, path: &str) -> bool {
        segments(path).any(|s| s.starts_with('_'))
    }

    /// True iff any segment starts with `.`.
    #[must_use]
    pub fn is_private(&self, path: &str) -> bool {
        segments(path).any(|s| s.starts_with('.'))
    }

    /// True iff the path lies under one of the static directories.
    #[must_use]
    pub fn is_static(&self, path: &str) -> bool {
        self.static_prefix(path).is_some()
    }

    /// True iff the path lies under one of the document directories.
    #[must_use]
    pub fn is_document(&self, path: &str) -> bool {
        self.document_prefix(path).is_some()
    }

    /// True iff no other category applies.
    #[must_use]
    pub fn is_page(&self, path: &str) -> bool {
        self.classify(path) == Category::Page
    }

    /// The first configured static directory containing `path`.
    #[must_use]
    pub fn static_prefix(&self, path: &str) -> Option<&str> {
        first_containing(&self.static_dirs, path)
    }

    /// The first configured document directory containing `path`.
    #[must_use]
    pub fn document_prefix(&self, path: &str) -> Option<&str> {
        first_containing(&self.document_dirs, path)
    }

    /// Classify a path. Module, then Private, Static, Document; else Page.
    #[must_use]
    pub fn classify(&self, path: &str) -> Category {
        if self.is_module(path) {
            Category::Module
        } else if self.is_private(path) {
            Category::Private
        } else if self.is_static(path) {
            Category::Static
        } else if self.is_document(path) {
            Category::Document
        } else {
            Category::Page
        }
    }

    /// Configured static directories.
    #[must_use]
    pub fn static_dirs(&self) -> &[String] {
        &self.static_dirs
    }

    /// Configured document directories.
    #[must_use]
    pub fn document_dirs(&self) -> &[String] {
        &self.document_dirs
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty() && *s != ".")
}

fn first_containing<'a>(prefixes: &'a [String], path: &str) -> Option<&'a str> {
    prefixes
        .iter()
        .find(|prefix| is_within(prefix, path))
        .map(String::as_str)
}

/// Directory containment on segment boundaries: `css` contains `css` and
/// `css/a.css`, but not `cssx/a.css`. An empty prefix contains nothing.
pub fn is_within(prefix: &str, path: &str) -> bool {
    let mut path_segments = segments(path);
    let mut matched = false;
    for expected in segments(prefix) {
        match path_segments.next() {
            Some(actual) if actual == expected => matched = true,
            _ => return false,
        }
    }
    matched
}

/// Convert `path` under `root` into a `/`-separated relative path.
///
/// Returns `None` if `path` is not inside `root` or is not valid UTF-8.
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}
