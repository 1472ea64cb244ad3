//! Site configuration management.
//!
//! A [`Config`] is assembled once per invocation (defaults, optional TOML file,
//! environment, command-line overrides), normalised with [`Config::prepare`] and
//! then handed by reference to every component. Nothing mutates it afterwards.

use std::path::{Component, Path, PathBuf};

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Environment variable prefix, e.g. `QUIRE__BUILD__OUTPUT_DIR`.
pub const ENV_PREFIX: &str = "QUIRE";

/// Main configuration structure for Quire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Document conversion settings.
    #[serde(default)]
    pub documents: DocumentConfig,
}

/// Build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory holding page templates, modules, static files and documents.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Directory the site is rendered into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Text encoding of templates and rendered output.
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Source-relative directories whose files are copied verbatim.
    #[serde(default)]
    pub static_dirs: Vec<String>,
}

/// Document conversion configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Source-relative directories holding documents to convert.
    #[serde(default)]
    pub dirs: Vec<String>,

    /// Document format tags (file extensions) to convert.
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,

    /// Write `name/index.html` instead of `name.html`.
    #[serde(default = "default_true")]
    pub pretty_links: bool,

    /// Pandoc executable used for non-Markdown formats.
    #[serde(default = "default_pandoc")]
    pub pandoc: PathBuf,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_formats() -> Vec<String> {
    vec!["org".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_pandoc() -> PathBuf {
    PathBuf::from("pandoc")
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            encoding: default_encoding(),
            static_dirs: Vec::new(),
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            dirs: Vec::new(),
            formats: default_formats(),
            pretty_links: true,
            pandoc: default_pandoc(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.prepare()
    }

    /// Load configuration layered from defaults, an optional file and `QUIRE__*`
    /// environment variables.
    ///
    /// A missing file is only an error when `required` is set.
    pub fn load_with_env(path: &Path, required: bool) -> Result<Self> {
        if required && !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("build.static_dirs")
                    .with_list_parse_key("documents.dirs")
                    .with_list_parse_key("documents.formats"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        tracing::debug!(?config, "loaded layered configuration");
        config.prepare()
    }

    /// Normalise directory prefixes and validate the result.
    ///
    /// Call this after applying any overrides; the returned value is final.
    pub fn prepare(mut self) -> Result<Self> {
        self.build.static_dirs = normalize_prefixes(&self.build.static_dirs);
        self.documents.dirs = normalize_prefixes(&self.documents.dirs);
        self.documents.formats = self
            .documents
            .formats
            .iter()
            .map(|f| f.trim().trim_start_matches('.').to_string())
            .filter(|f| !f.is_empty())
            .collect();
        self.validate()?;
        Ok(self)
    }

    /// Validate values that do not depend on the filesystem.
    pub fn validate(&self) -> Result<()> {
        match Encoding::for_label(self.build.encoding.trim().as_bytes()) {
            None => {
                return Err(CoreError::config(format!(
                    "unsupported encoding '{}'",
                    self.build.encoding
                )));
            }
            // UTF-16 and the replacement encoding cannot be written back.
            Some(encoding) if encoding.output_encoding() != encoding => {
                return Err(CoreError::config(format!(
                    "unsupported encoding '{}': cannot encode output as {}",
                    self.build.encoding,
                    encoding.name()
                )));
            }
            Some(_) => {}
        }

        let prefixes = self.build.static_dirs.iter().map(|d| ("static", d));
        let documents = self.documents.dirs.iter().map(|d| ("document", d));
        for (role, dir) in prefixes.chain(documents) {
            let path = Path::new(dir);
            let escapes = path
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if escapes {
                return Err(CoreError::config(format!(
                    "{role} directory '{dir}' must be relative to the source directory"
                )));
            }
        }

        Ok(())
    }

    /// Check that the source, output and static directories exist.
    ///
    /// Returns the first offending directory.
    pub fn validate_paths(&self) -> Result<()> {
        if !self.build.source_dir.is_dir() {
            return Err(CoreError::invalid_directory(
                "template",
                &self.build.source_dir,
            ));
        }

        if !self.build.output_dir.is_dir() {
            return Err(CoreError::invalid_directory(
                "output",
                &self.build.output_dir,
            ));
        }

        for dir in &self.build.static_dirs {
            let path = self.build.source_dir.join(dir);
            if !path.is_dir() {
                return Err(CoreError::invalid_directory("static files", path));
            }
        }

        Ok(())
    }

    /// The text encoding of templates, documents and output.
    ///
    /// Unknown labels resolve to UTF-8; [`validate`](Self::validate) rejects them.
    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        Encoding::for_label(self.build.encoding.trim().as_bytes()).unwrap_or(encoding_rs::UTF_8)
    }

    /// Absolute-or-relative path of a source-relative file.
    pub fn source_path(&self, relative: &str) -> PathBuf {
        self.build.source_dir.join(relative)
    }

    /// Path of a file under the output root.
    pub fn output_path(&self, relative: &str) -> PathBuf {
        self.build.output_dir.join(relative)
    }
}

/// Normalise a list of source-relative directory prefixes.
///
/// Separators become `/`, a leading `./` and trailing `/` are removed and empty
/// entries are dropped. Order is preserved.
pub fn normalize_prefixes(prefixes: &[String]) -> Vec<String> {
    prefixes
        .iter()
        .map(|p| normalize_prefix(p))
        .filter(|p| !p.is_empty())
        .collect()
}

/// Normalise a single source-relative prefix.
pub fn normalize_prefix(prefix: &str) -> String {
    prefix
        .trim()
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect::<Vec<_>>()
        .join("/")
}
