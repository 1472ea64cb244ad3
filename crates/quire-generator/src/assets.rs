//! Static asset copying.
//!
//! Static files are copied byte-for-byte from the source root to the same
//! relative location under the output root.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

/// Asset copying errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error at a specific path.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

fn io_at(path: &Path) -> impl FnOnce(std::io::Error) -> AssetError + '_ {
    move |source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Copies static files from the source root into the output root.
#[derive(Debug, Clone)]
pub struct AssetCopier {
    source_root: PathBuf,
    output_root: PathBuf,
}

impl AssetCopier {
    /// Create a copier between two roots.
    #[must_use]
    pub fn new(source_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            output_root: output_root.into(),
        }
    }

    /// Copy one source-relative file, returning its destination.
    pub fn copy(&self, relative: &str) -> Result<PathBuf> {
        let source = self.source_root.join(relative);
        let dest = self.output_root.join(relative);
        Self::copy_file(&source, &dest)?;

        debug!(
            src = %source.display(),
            dest = %dest.display(),
            "copied asset"
        );

        Ok(dest)
    }

    /// Copy every listed file, returning how many were copied.
    pub fn copy_all<'a>(&self, relatives: impl IntoIterator<Item = &'a str>) -> Result<usize> {
        let mut count = 0;
        for relative in relatives {
            self.copy(relative)?;
            count += 1;
        }
        Ok(count)
    }

    /// Copy a single file, creating the destination's parent directories.
    pub fn copy_file(source: &Path, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            Self::ensure_dir(parent)?;
        }
        fs::copy(source, dest).map_err(io_at(source))?;
        Ok(())
    }

    /// Create a directory if it doesn't exist.
    pub fn ensure_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(io_at(path))?;
        }
        Ok(())
    }
}
