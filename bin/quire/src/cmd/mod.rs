//! Command implementations and the options they share.

pub mod build;
pub mod check;
pub mod watch;

use std::path::{Path, PathBuf};

use clap::Args;
use color_eyre::eyre::{Result, WrapErr};
use quire_core::Config;

/// Default configuration file, read when present.
pub const DEFAULT_CONFIG_FILE: &str = "quire.toml";

/// Site options accepted by every command. Anything given here overrides the
/// configuration file and environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct SiteArgs {
    /// Render templates from this directory [default: ./templates]
    #[arg(long = "src", value_name = "PATH")]
    pub src: Option<PathBuf>,

    /// Write the rendered site to this directory [default: ./build]
    #[arg(long = "out", value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Comma-separated list of static directories inside the source directory
    #[arg(long = "static", value_name = "A,B,C", value_delimiter = ',')]
    pub static_dirs: Option<Vec<String>>,

    /// Comma-separated list of document directories inside the source directory
    #[arg(long = "documents", value_name = "A,B,C", value_delimiter = ',')]
    pub documents: Option<Vec<String>>,

    /// Comma-separated list of document formats to convert (e.g. org,md)
    #[arg(long = "formats", value_name = "A,B,C", value_delimiter = ',')]
    pub formats: Option<Vec<String>>,

    /// Write documents as `name.html` instead of `name/index.html`
    #[arg(long)]
    pub no_pretty_links: bool,

    /// Text encoding of templates and output
    #[arg(long, value_name = "ENCODING")]
    pub encoding: Option<String>,

    /// Pandoc executable used for non-Markdown documents
    #[arg(long, value_name = "PROGRAM")]
    pub pandoc: Option<PathBuf>,
}

impl SiteArgs {
    /// Apply these overrides on top of a loaded configuration.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(src) = &self.src {
            config.build.source_dir = src.clone();
        }
        if let Some(out) = &self.out {
            config.build.output_dir = out.clone();
        }
        if let Some(dirs) = &self.static_dirs {
            config.build.static_dirs = dirs.clone();
        }
        if let Some(dirs) = &self.documents {
            config.documents.dirs = dirs.clone();
        }
        if let Some(formats) = &self.formats {
            config.documents.formats = formats.clone();
        }
        if self.no_pretty_links {
            config.documents.pretty_links = false;
        }
        if let Some(encoding) = &self.encoding {
            config.build.encoding = encoding.clone();
        }
        if let Some(pandoc) = &self.pandoc {
            config.documents.pandoc = pandoc.clone();
        }
        config
    }
}

/// Resolve the configuration for one invocation.
///
/// An explicitly named config file must exist; the default one is optional.
pub fn load_config(config_path: Option<&Path>, args: &SiteArgs) -> Result<Config> {
    let (path, required) = match config_path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };

    let config = Config::load_with_env(path, required).wrap_err("Failed to load configuration")?;
    let config = args
        .apply(config)
        .prepare()
        .wrap_err("Invalid configuration")?;

    tracing::debug!(?config, "resolved configuration");
    Ok(config)
}
