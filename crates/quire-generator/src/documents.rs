//! Document discovery and output layout.

use std::{fs, io, path::Path};

/// Name of the module that wraps documents from `dir`: `_<basename>.html`.
#[must_use]
pub fn module_for(dir: &str) -> String {
    let basename = dir.rsplit('/').next().unwrap_or(dir);
    format!("_{basename}.html")
}

/// Format tag of a document path: its extension.
#[must_use]
pub fn format_of(path: &str) -> Option<&str> {
    let file = path.rsplit('/').next()?;
    let (stem, ext) = file.rsplit_once('.')?;
    (!stem.is_empty() && !ext.is_empty()).then_some(ext)
}

/// Output path of a document relative to the output root.
///
/// With pretty links `posts/hello.org` becomes `hello/index.html`, otherwise
/// `hello.html`.
#[must_use]
pub fn output_path(path: &str, pretty_links: bool) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    if pretty_links {
        format!("{stem}/index.html")
    } else {
        format!("{stem}.html")
    }
}

/// Whether `path` sits directly inside `dir` (no intermediate directories).
#[must_use]
pub fn is_direct_child(dir: &str, path: &str) -> bool {
    path.strip_prefix(dir)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
}

/// Documents of `format` directly inside `source_root/dir`, as source-relative
/// paths. Hidden files are skipped.
pub fn list_documents(source_root: &Path, dir: &str, format: &str) -> io::Result<Vec<String>> {
    let mut documents = Vec::new();
    for entry in fs::read_dir(source_root.join(dir))? {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') || format_of(&name) != Some(format) {
            continue;
        }
        documents.push(format!("{dir}/{name}"));
    }
    Ok(documents)
}
