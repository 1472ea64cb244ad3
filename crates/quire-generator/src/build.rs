//! Build orchestration.
//!
//! A full build runs three stages in order: documents, pages, static files.
//! A partial build re-runs only the stage (and the members) a changed path
//! affects. Everything runs sequentially on the calling thread.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use quire_core::{Category, Config, CoreError, PathClassifier, is_within, relative_slash_path};
use quire_parser::{ConvertError, ConverterRegistry, DocumentConverter, PandocConverter};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    assets::{AssetCopier, AssetError},
    deps::DependencySet,
    documents,
    template::{self, Renderable, TemplateEngine, TemplateError},
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A document directory has no wrapping module.
    #[error("No template {} has been found for document directory '{dir}', aborting", template.display())]
    MissingTemplate { template: PathBuf, dir: String },

    /// IO error at a specific path.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source file is not valid in the configured encoding.
    #[error("{} is not valid {encoding}", path.display())]
    Decode {
        path: PathBuf,
        encoding: &'static str,
    },

    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Document conversion error.
    #[error("failed to convert {}: {source}", path.display())]
    Convert {
        path: PathBuf,
        #[source]
        source: ConvertError,
    },

    /// Asset error.
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] CoreError),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

fn io_at(path: &Path) -> impl FnOnce(std::io::Error) -> BuildError + '_ {
    move |source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Build statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Number of documents converted.
    pub documents: usize,

    /// Number of pages rendered.
    pub pages: usize,

    /// Number of static files copied.
    pub assets: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// What a partial build did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialOutcome {
    /// Re-rendered this many pages.
    Pages(usize),
    /// Converted one document to this output file.
    Document(PathBuf),
    /// Copied one static file to this output file.
    Asset(PathBuf),
    /// Nothing to do for the path.
    Skipped,
}

/// Site builder that orchestrates full and partial builds.
pub struct SiteBuilder {
    config: Config,
    classifier: PathClassifier,
    converter: Box<dyn DocumentConverter>,
    /// Output root as a source-relative prefix, when it lies inside the source root.
    nested_output: Option<String>,
}

impl std::fmt::Debug for SiteBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteBuilder")
            .field("config", &self.config)
            .field("classifier", &self.classifier)
            .field("nested_output", &self.nested_output)
            .finish_non_exhaustive()
    }
}

impl SiteBuilder {
    /// Create a builder for a prepared configuration, converting documents with
    /// the default converters.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let pandoc = PandocConverter::new(config.documents.pandoc.clone());
        let nested_output = nested_prefix(&config.build.source_dir, &config.build.output_dir);
        if let Some(prefix) = &nested_output {
            debug!(%prefix, "output directory is inside the source directory");
        }
        Self {
            classifier: PathClassifier::from_config(&config),
            converter: Box::new(ConverterRegistry::new(pandoc)),
            config,
            nested_output,
        }
    }

    /// Use a different document converter.
    #[must_use]
    pub fn with_converter(mut self, converter: impl DocumentConverter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    /// The configuration this builder renders.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The path classifier in use.
    #[must_use]
    pub fn classifier(&self) -> &PathClassifier {
        &self.classifier
    }

    /// Source root.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.config.build.source_dir
    }

    /// Output root.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.config.build.output_dir
    }

    /// Whether a source-relative path belongs to the output root.
    #[must_use]
    pub fn is_output(&self, path: &str) -> bool {
        self.nested_output
            .as_deref()
            .is_some_and(|prefix| is_within(prefix, path))
    }

    /// Execute the full build: documents, then pages, then static files.
    pub fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();

        info!(
            source = %self.source_dir().display(),
            output = %self.output_dir().display(),
            "starting build"
        );

        // 1. Ensure output directory
        fs::create_dir_all(self.output_dir()).map_err(io_at(self.output_dir()))?;

        let engine = TemplateEngine::new(self.source_dir(), self.config.encoding());

        // 2. Documents
        stats.documents = self.render_documents(&engine)?;

        // 3. Pages
        let pages = self.enumerate(&engine, Category::Page)?;
        stats.pages = self.render_pages(&engine, &pages)?;

        // 4. Static files
        let assets = self.enumerate(&engine, Category::Static)?;
        stats.assets = self.copier().copy_all(assets.iter().map(String::as_str))?;

        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            documents = stats.documents,
            pages = stats.pages,
            assets = stats.assets,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    /// Rebuild only what depends on one changed source-relative path.
    pub fn rebuild(&self, path: &str) -> Result<PartialOutcome> {
        if self.is_output(path) {
            debug!(path, "ignoring change inside output directory");
            return Ok(PartialOutcome::Skipped);
        }

        let outcome = match DependencySet::resolve(&self.classifier, path) {
            DependencySet::AllPages => {
                let engine = TemplateEngine::new(self.source_dir(), self.config.encoding());
                let pages = self.enumerate(&engine, Category::Page)?;
                PartialOutcome::Pages(self.render_pages(&engine, &pages)?)
            }
            DependencySet::Page(page) => {
                let engine = TemplateEngine::new(self.source_dir(), self.config.encoding());
                self.render_page(&engine, &page)?;
                PartialOutcome::Pages(1)
            }
            DependencySet::Static(asset) => PartialOutcome::Asset(self.copier().copy(&asset)?),
            DependencySet::Document(document) => self.rebuild_document(&document)?,
            DependencySet::Nothing => PartialOutcome::Skipped,
        };

        info!(path, ?outcome, "partial build complete");
        Ok(outcome)
    }

    /// List source paths of one category, pruning hidden directories and the
    /// output directory.
    pub fn enumerate(&self, engine: &TemplateEngine, category: Category) -> Result<Vec<String>> {
        let names =
            engine.list_templates(|dir| self.classifier.is_private(dir) || self.is_output(dir))?;
        Ok(names
            .into_iter()
            .filter(|name| !self.is_output(name) && self.classifier.classify(name) == category)
            .collect())
    }

    fn copier(&self) -> AssetCopier {
        AssetCopier::new(self.source_dir(), self.output_dir())
    }

    /// Render a list of pages.
    fn render_pages(&self, engine: &TemplateEngine, pages: &[String]) -> Result<usize> {
        info!(count = pages.len(), "rendering pages");
        for page in pages {
            self.render_page(engine, page)?;
        }
        Ok(pages.len())
    }

    /// Render one page to the mirrored path under the output root.
    fn render_page(&self, engine: &TemplateEngine, name: &str) -> Result<()> {
        let source = self.config.source_path(name);
        if !source.is_file() {
            return Err(BuildError::Io {
                path: source,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "template not found"),
            });
        }
        let page = engine.page(name);
        self.write(name, &page)
    }

    /// Convert every document of every configured format.
    fn render_documents(&self, engine: &TemplateEngine) -> Result<usize> {
        let mut count = 0;
        for format in &self.config.documents.formats {
            for dir in self.classifier.document_dirs() {
                count += self.render_document_dir(engine, format, dir)?;
            }
        }
        Ok(count)
    }

    /// Convert the documents of one format in one directory.
    ///
    /// The wrapping module is checked before anything in the directory is written.
    fn render_document_dir(&self, engine: &TemplateEngine, format: &str, dir: &str) -> Result<usize> {
        self.require_module(dir)?;

        let dir_path = self.config.source_path(dir);
        if !dir_path.is_dir() {
            warn!(dir = %dir_path.display(), "document directory does not exist, skipping");
            return Ok(0);
        }

        let docs = documents::list_documents(self.source_dir(), dir, format)
            .map_err(io_at(&dir_path))?;
        info!(dir, format, count = docs.len(), "converting documents");

        for doc in &docs {
            self.render_document(engine, dir, doc, format)?;
        }
        Ok(docs.len())
    }

    fn rebuild_document(&self, path: &str) -> Result<PartialOutcome> {
        // The directory holding the file directly, which may be nested in another one.
        let Some(dir) = self
            .classifier
            .document_dirs()
            .iter()
            .find(|dir| documents::is_direct_child(dir, path))
        else {
            debug!(path, "not directly inside a document directory, skipping");
            return Ok(PartialOutcome::Skipped);
        };
        let Some(format) = documents::format_of(path) else {
            return Ok(PartialOutcome::Skipped);
        };
        let configured = self.config.documents.formats.iter().any(|f| f == format);
        if !configured {
            debug!(path, "not a convertible document, skipping");
            return Ok(PartialOutcome::Skipped);
        }

        self.require_module(dir)?;
        let engine = TemplateEngine::new(self.source_dir(), self.config.encoding());
        let dest = self.render_document(&engine, dir, path, format)?;
        Ok(PartialOutcome::Document(dest))
    }

    fn require_module(&self, dir: &str) -> Result<String> {
        let module = documents::module_for(dir);
        let template = self.config.source_path(&module);
        if !template.is_file() {
            return Err(BuildError::MissingTemplate {
                template,
                dir: dir.to_string(),
            });
        }
        Ok(module)
    }

    /// Convert one document, wrap it in its directory's module and write it.
    fn render_document(
        &self,
        engine: &TemplateEngine,
        dir: &str,
        path: &str,
        format: &str,
    ) -> Result<PathBuf> {
        let source = self.config.source_path(path);
        let bytes = fs::read(&source).map_err(io_at(&source))?;
        let encoding = self.config.encoding();
        let text = template::decode(&bytes, encoding).ok_or_else(|| BuildError::Decode {
            path: source.clone(),
            encoding: encoding.name(),
        })?;
        let html = self
            .converter
            .convert(&text, format)
            .map_err(|e| BuildError::Convert {
                path: source.clone(),
                source: e,
            })?;

        let document = engine.wrap_document(path, documents::module_for(dir), html);
        let relative = documents::output_path(path, self.config.documents.pretty_links);
        self.write(&relative, &document)?;
        Ok(self.config.output_path(&relative))
    }

    /// Render and write to a path relative to the output root.
    fn write(&self, relative: &str, renderable: &dyn Renderable) -> Result<()> {
        let bytes = renderable.render(self.config.encoding())?;
        let dest = self.config.output_path(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(io_at(parent))?;
        }
        fs::write(&dest, bytes).map_err(io_at(&dest))?;

        debug!(name = renderable.name(), dest = %dest.display(), "rendered");
        Ok(())
    }
}

/// The output root as a source-relative prefix, if it lies inside the source root.
fn nested_prefix(source: &Path, output: &Path) -> Option<String> {
    let canonical = |p: &Path| p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
    relative_slash_path(source, output)
        .or_else(|| relative_slash_path(&canonical(source), &canonical(output)))
}

#[cfg(test)]
mod tests {
    use quire_parser::Result as ConvertResult;
    use tempfile::TempDir;

    use super::*;

    /// Wraps the raw text in a `<pre>` tagged with the format.
    struct EchoConverter;

    impl DocumentConverter for EchoConverter {
        fn convert(&self, text: &str, format: &str) -> ConvertResult<String> {
            Ok(format!("<pre class=\"{format}\">{}</pre>", text.trim()))
        }
    }

    fn test_config(src: &Path, out: &Path) -> Config {
        let mut config = Config::default();
        config.build.source_dir = src.to_path_buf();
        config.build.output_dir = out.to_path_buf();
        config
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn builder(src: &Path, out: &Path, static_dirs: &[&str], doc_dirs: &[&str]) -> SiteBuilder {
        let mut config = test_config(src, out);
        config.build.static_dirs = static_dirs.iter().map(|s| s.to_string()).collect();
        config.documents.dirs = doc_dirs.iter().map(|s| s.to_string()).collect();
        SiteBuilder::new(config.prepare().unwrap()).with_converter(EchoConverter)
    }

    #[test]
    fn test_build_empty_site() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        let stats = builder(src.path(), &out.path().join("site"), &[], &[])
            .build()
            .unwrap();

        assert_eq!(stats.pages, 0);
        assert_eq!(stats.documents, 0);
        assert!(out.path().join("site").is_dir());
    }

    #[test]
    fn test_build_pages_and_skips_modules_and_private() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "_base.html", "<main>{% block body %}{% endblock %}</main>");
        write(
            src.path(),
            "blog/index.html",
            "{% extends \"_base.html\" %}{% block body %}blog{% endblock %}",
        );
        write(src.path(), ".git/HEAD", "ref: main");
        write(src.path(), "_partials/nav.html", "<nav></nav>");

        let stats = builder(src.path(), out.path(), &[], &[]).build().unwrap();

        assert_eq!(stats.pages, 1);
        assert_eq!(
            fs::read_to_string(out.path().join("blog/index.html")).unwrap(),
            "<main>blog</main>"
        );
        assert!(!out.path().join("_base.html").exists());
        assert!(!out.path().join("_partials").exists());
        assert!(!out.path().join(".git").exists());
    }

    #[test]
    fn test_build_with_multiple_static_dirs() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "css/site.css", "body {}");
        write(src.path(), "img/logo.svg", "<svg/>");
        write(src.path(), "fonts/a.woff", "woff");
        write(src.path(), "page.html", "{{ 1 + 1 }}");

        let stats = builder(src.path(), out.path(), &["css", "img"], &[])
            .build()
            .unwrap();

        assert_eq!(stats.assets, 2);
        assert_eq!(stats.pages, 2, "fonts/a.woff is not static, so it is a page");
        assert_eq!(fs::read_to_string(out.path().join("img/logo.svg")).unwrap(), "<svg/>");
        assert_eq!(fs::read_to_string(out.path().join("page.html")).unwrap(), "2");
    }

    #[test]
    fn test_rebuild_document_in_nested_document_dir() {
        let src = TempDir::new().unwrap();
        let full_out = TempDir::new().unwrap();
        let partial_out = TempDir::new().unwrap();
        write(src.path(), "_posts.html", "<post>{% block body %}{% endblock %}</post>");
        write(src.path(), "_archive.html", "<old>{% block body %}{% endblock %}</old>");
        write(src.path(), "posts/archive/old.org", "* Old\n");
        let dirs = ["posts", "posts/archive"];

        let stats = builder(src.path(), full_out.path(), &[], &dirs).build().unwrap();
        assert_eq!(stats.documents, 1);

        let outcome = builder(src.path(), partial_out.path(), &[], &dirs)
            .rebuild("posts/archive/old.org")
            .unwrap();
        let dest = partial_out.path().join("old/index.html");
        assert_eq!(outcome, PartialOutcome::Document(dest.clone()));

        let expected = fs::read_to_string(full_out.path().join("old/index.html")).unwrap();
        assert_eq!(expected, "<old><pre class=\"org\">* Old</pre></old>");
        assert_eq!(fs::read_to_string(dest).unwrap(), expected);
    }

    #[test]
    fn test_build_in_latin1() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(src.path().join("_posts.html"), b"<h1>R\xe9sum\xe9</h1>{% block body %}{% endblock %}")
            .unwrap();
        fs::write(src.path().join("index.html"), b"<p>\xa9 {{ 2000 + 25 }}</p>").unwrap();
        fs::create_dir_all(src.path().join("posts")).unwrap();
        fs::write(src.path().join("posts/na\u{ef}ve.org"), b"na\xefve").unwrap();

        let mut config = test_config(src.path(), out.path());
        config.build.encoding = "latin-1".to_string();
        config.documents.dirs = vec!["posts".to_string()];
        let builder = SiteBuilder::new(config.prepare().unwrap()).with_converter(EchoConverter);

        let stats = builder.build().unwrap();

        assert_eq!(stats.documents, 1);
        assert_eq!(fs::read(out.path().join("index.html")).unwrap(), b"<p>\xa9 2025</p>");
        assert_eq!(
            fs::read(out.path().join("na\u{ef}ve/index.html")).unwrap(),
            b"<h1>R\xe9sum\xe9</h1><pre class=\"org\">na\xefve</pre>"
        );
    }

    #[test]
    fn test_document_in_wrong_encoding_is_error() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "_posts.html", "{% block body %}{% endblock %}");
        fs::create_dir_all(src.path().join("posts")).unwrap();
        fs::write(src.path().join("posts/bad.org"), b"caf\xe9").unwrap();

        let err = builder(src.path(), out.path(), &[], &["posts"])
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::Decode { encoding: "UTF-8", .. }));
    }

    #[test]
    fn test_static_files_are_not_rendered() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "js/app.js", "let x = `{{ y }}`;");

        builder(src.path(), out.path(), &["js"], &[]).build().unwrap();

        assert_eq!(
            fs::read_to_string(out.path().join("js/app.js")).unwrap(),
            "let x = `{{ y }}`;"
        );
    }

    #[test]
    fn test_documents_pretty_links() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "_posts.html", "<article>{% block body %}{% endblock %}</article>");
        write(src.path(), "posts/hello.org", "* Hello\n");
        write(src.path(), "posts/notes.txt", "not a document format");

        let stats = builder(src.path(), out.path(), &[], &["posts"]).build().unwrap();

        assert_eq!(stats.documents, 1);
        assert_eq!(stats.pages, 0);
        assert_eq!(
            fs::read_to_string(out.path().join("hello/index.html")).unwrap(),
            "<article><pre class=\"org\">* Hello</pre></article>"
        );
    }

    #[test]
    fn test_documents_without_pretty_links() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "_posts.html", "{% block body %}{% endblock %}");
        write(src.path(), "posts/hello.org", "x");

        let mut config = test_config(src.path(), out.path());
        config.documents.dirs = vec!["posts".to_string()];
        config.documents.pretty_links = false;
        SiteBuilder::new(config.prepare().unwrap())
            .with_converter(EchoConverter)
            .build()
            .unwrap();

        assert!(out.path().join("hello.html").is_file());
        assert!(!out.path().join("hello").exists());
    }

    #[test]
    fn test_missing_document_module_aborts() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "posts/hello.org", "* Hello");
        write(src.path(), "index.html", "home");

        let err = builder(src.path(), out.path(), &[], &["posts"])
            .build()
            .unwrap_err();

        assert!(matches!(err, BuildError::MissingTemplate { ref dir, .. } if dir == "posts"));
        assert!(err.to_string().contains("_posts.html"));
        assert!(!out.path().join("hello").exists());
        assert!(!out.path().join("index.html").exists());
    }

    #[test]
    fn test_missing_document_dir_is_skipped() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "_posts.html", "{% block body %}{% endblock %}");

        let stats = builder(src.path(), out.path(), &[], &["posts"]).build().unwrap();
        assert_eq!(stats.documents, 0);
    }

    #[test]
    fn test_build_is_idempotent() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "_base.html", "<b>{% block body %}{% endblock %}</b>");
        write(src.path(), "_posts.html", "{% extends \"_base.html\" %}");
        write(src.path(), "a/b.html", "{% extends \"_base.html\" %}{% block body %}b{% endblock %}");
        write(src.path(), "posts/p.org", "p");
        write(src.path(), "css/x.css", "x");

        let b = builder(src.path(), out.path(), &["css"], &["posts"]);
        b.build().unwrap();
        let first = snapshot(out.path());
        b.build().unwrap();
        assert_eq!(first, snapshot(out.path()));
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_output_inside_source_is_excluded() {
        let src = TempDir::new().unwrap();
        write(src.path(), "index.html", "home");
        let out = src.path().join("build");

        let b = builder(src.path(), &out, &[], &[]);
        b.build().unwrap();
        let stats = b.build().unwrap();

        assert_eq!(stats.pages, 1);
        assert!(!out.join("build").exists());
        assert!(b.is_output("build/index.html"));
        assert_eq!(b.rebuild("build/index.html").unwrap(), PartialOutcome::Skipped);
    }

    #[test]
    fn test_rebuild_page_matches_full_build() {
        let src = TempDir::new().unwrap();
        let full = TempDir::new().unwrap();
        let partial = TempDir::new().unwrap();
        write(src.path(), "_base.html", "[{% block body %}{% endblock %}]");
        write(src.path(), "docs/a.html", "{% extends \"_base.html\" %}{% block body %}a{% endblock %}");

        builder(src.path(), full.path(), &[], &[]).build().unwrap();
        let outcome = builder(src.path(), partial.path(), &[], &[])
            .rebuild("docs/a.html")
            .unwrap();

        assert_eq!(outcome, PartialOutcome::Pages(1));
        assert_eq!(
            fs::read(full.path().join("docs/a.html")).unwrap(),
            fs::read(partial.path().join("docs/a.html")).unwrap()
        );
    }

    #[test]
    fn test_rebuild_module_renders_all_pages() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "_base.html", "v1 {% block body %}{% endblock %}");
        write(src.path(), "a.html", "{% extends \"_base.html\" %}{% block body %}a{% endblock %}");
        write(src.path(), "b.html", "{% extends \"_base.html\" %}{% block body %}b{% endblock %}");

        let b = builder(src.path(), out.path(), &[], &[]);
        b.build().unwrap();
        write(src.path(), "_base.html", "v2 {% block body %}{% endblock %}");

        assert_eq!(b.rebuild("_base.html").unwrap(), PartialOutcome::Pages(2));
        assert_eq!(fs::read_to_string(out.path().join("a.html")).unwrap(), "v2 a");
        assert_eq!(fs::read_to_string(out.path().join("b.html")).unwrap(), "v2 b");
    }

    #[test]
    fn test_rebuild_static_only_copies() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "css/site.css", "body {}");
        write(src.path(), "index.html", "home");

        let outcome = builder(src.path(), out.path(), &["css"], &[])
            .rebuild("css/site.css")
            .unwrap();

        assert_eq!(outcome, PartialOutcome::Asset(out.path().join("css/site.css")));
        assert!(!out.path().join("index.html").exists());
    }

    #[test]
    fn test_rebuild_document() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "_posts.html", "{% block body %}{% endblock %}");
        write(src.path(), "posts/hello.org", "hi");
        write(src.path(), "posts/draft.rst", "ignored");

        let b = builder(src.path(), out.path(), &[], &["posts"]);
        assert_eq!(
            b.rebuild("posts/hello.org").unwrap(),
            PartialOutcome::Document(out.path().join("hello/index.html"))
        );
        assert_eq!(b.rebuild("posts/draft.rst").unwrap(), PartialOutcome::Skipped);
    }

    #[test]
    fn test_rebuild_private_is_skipped() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), ".notes.html", "secret");

        let outcome = builder(src.path(), out.path(), &[], &[])
            .rebuild(".notes.html")
            .unwrap();
        assert_eq!(outcome, PartialOutcome::Skipped);
        assert!(!out.path().join(".notes.html").exists());
    }

    #[test]
    fn test_rebuild_missing_page_names_path() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        let err = builder(src.path(), out.path(), &[], &[])
            .rebuild("gone.html")
            .unwrap_err();
        assert!(err.to_string().contains("gone.html"));
    }

    fn snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
        let mut files: Vec<_> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = relative_slash_path(root, e.path()).unwrap();
                (rel, fs::read(e.path()).unwrap())
            })
            .collect();
        files.sort();
        files
    }
}
