//! Template engine and renderables.
//!
//! Templates are Jinja-compatible ([`minijinja`]) and loaded from the source
//! root, so `{% extends %}` and `{% include %}` resolve against it. Template
//! files are decoded, and output encoded, with the site's configured text
//! encoding ([`encoding_rs`]). Anything that
//! produces an output file implements [`Renderable`]: either a page template on
//! disk ([`PageTemplate`]) or a converted document wrapped in a module
//! ([`WrappedDocument`]).

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use encoding_rs::Encoding;
use minijinja::{Environment, ErrorKind, context};
use quire_core::relative_slash_path;
use thiserror::Error;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Template errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Loading or rendering a template failed.
    #[error("failed to render {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// Walking the template directory failed.
    #[error("failed to list templates: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Something that renders to the bytes of one output file.
pub trait Renderable {
    /// Source-relative name of the renderable.
    fn name(&self) -> &str;

    /// Render to bytes in the given text encoding.
    fn render(&self, encoding: &'static Encoding) -> Result<Vec<u8>>;
}

/// Jinja environment rooted at the source directory.
///
/// The environment caches parsed templates, so build a new engine for each
/// build pass to pick up edited files.
pub struct TemplateEngine {
    root: PathBuf,
    env: Environment<'static>,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl TemplateEngine {
    /// Create an engine loading templates from `root`, decoded with `encoding`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, encoding: &'static Encoding) -> Self {
        let root = root.into();
        let mut env = Environment::new();
        let loader_root = root.clone();
        env.set_loader(move |name| load_template(&loader_root, name, encoding));
        Self { root, env }
    }

    /// List every file below the root as a `/`-separated relative name.
    ///
    /// Symlinks are followed. Directories for which `prune` returns true are not
    /// descended into. Order is whatever the directory listing yields.
    pub fn list_templates(&self, prune: impl Fn(&str) -> bool) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                relative_slash_path(&self.root, entry.path()).is_none_or(|rel| !prune(&rel))
            });

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(name) = relative_slash_path(&self.root, entry.path()) {
                trace!(%name, "found template candidate");
                names.push(name);
            }
        }

        Ok(names)
    }

    /// Get a page template by name.
    #[must_use]
    pub fn page(&self, name: impl Into<String>) -> PageTemplate<'_> {
        PageTemplate {
            engine: self,
            name: name.into(),
        }
    }

    /// Wrap converted document HTML in the named module's `body` block.
    #[must_use]
    pub fn wrap_document(
        &self,
        name: impl Into<String>,
        module: impl Into<String>,
        html: String,
    ) -> WrappedDocument<'_> {
        WrappedDocument {
            engine: self,
            name: name.into(),
            module: module.into(),
            html,
        }
    }

    /// Render a template file to a string.
    pub fn render_template(&self, name: &str) -> Result<String> {
        let render_err = |source| TemplateError::Render {
            name: name.to_string(),
            source,
        };
        let template = self.env.get_template(name).map_err(render_err)?;
        template.render(context! {}).map_err(render_err)
    }

    /// Render a synthesised template that extends `module` with `html` as its body.
    pub fn render_wrapped(&self, name: &str, module: &str, html: &str) -> Result<String> {
        let source = wrapper_source(module);
        self.env
            .render_named_str(name, &source, context! { content => html })
            .map_err(|source| TemplateError::Render {
                name: name.to_string(),
                source,
            })
    }
}

/// Template source that extends `module` and fills its `body` block with the
/// `content` variable, unescaped.
fn wrapper_source(module: &str) -> String {
    format!("{{% extends \"{module}\" %}}\n{{% block body %}}{{{{ content|safe }}}}{{% endblock %}}\n")
}

/// Decode file contents, dropping a byte order mark. `None` if malformed.
#[must_use]
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let (text, malformed) = encoding.decode_with_bom_removal(bytes);
    (!malformed).then(|| text.into_owned())
}

/// Encode rendered text for output.
///
/// Characters the encoding cannot represent become HTML numeric character
/// references.
fn encode(text: &str, encoding: &'static Encoding) -> Vec<u8> {
    let (bytes, _, unmappable) = encoding.encode(text);
    if unmappable {
        debug!(encoding = encoding.name(), "wrote unmappable characters as references");
    }
    bytes.into_owned()
}

/// Loader for template `name` below `root`. Names never leave the root.
fn load_template(
    root: &Path,
    name: &str,
    encoding: &'static Encoding,
) -> std::result::Result<Option<String>, minijinja::Error> {
    let mut path = root.to_path_buf();
    for segment in name.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Ok(None),
            _ if segment.contains('\\') => return Ok(None),
            _ => path.push(segment),
        }
    }

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(
                minijinja::Error::new(ErrorKind::InvalidOperation, "could not read template")
                    .with_source(e),
            );
        }
    };

    decode(&bytes, encoding).map(Some).ok_or_else(|| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("template is not valid {}", encoding.name()),
        )
    })
}

/// A page template file under the source root.
#[derive(Debug)]
pub struct PageTemplate<'e> {
    engine: &'e TemplateEngine,
    name: String,
}

impl Renderable for PageTemplate<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, encoding: &'static Encoding) -> Result<Vec<u8>> {
        Ok(encode(&self.engine.render_template(&self.name)?, encoding))
    }
}

/// Converted document HTML wrapped in a module template.
#[derive(Debug)]
pub struct WrappedDocument<'e> {
    engine: &'e TemplateEngine,
    name: String,
    module: String,
    html: String,
}

impl WrappedDocument<'_> {
    /// Name of the module providing the layout.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }
}

impl Renderable for WrappedDocument<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, encoding: &'static Encoding) -> Result<Vec<u8>> {
        let text = self
            .engine
            .render_wrapped(&self.name, &self.module, &self.html)?;
        Ok(encode(&text, encoding))
    }
}
