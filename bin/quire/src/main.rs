//! Quire CLI
//!
//! Static site generator for Jinja page templates, converted documents and
//! static assets.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use quire::cmd::{self, SiteArgs};

/// Command-line interface for Quire.
#[derive(Parser)]
#[command(
    name = "quire",
    version,
    about = "Render a tree of Jinja templates into a static site"
)]
struct Cli {
    /// Path to configuration file [default: quire.toml, if present]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Render the whole site once
    Build {
        #[command(flatten)]
        site: SiteArgs,
    },
    /// Render the site, then re-render on every source change
    Watch {
        #[command(flatten)]
        site: SiteArgs,
    },
    /// Validate configuration and the source tree
    Check {
        #[command(flatten)]
        site: SiteArgs,
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    quire::init_tracing(cli.verbose);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Build { site } => {
            let config = cmd::load_config(config_path, &site)?;
            tokio::task::spawn_blocking(move || cmd::build::run(config)).await??;
        }
        Commands::Watch { site } => {
            let config = cmd::load_config(config_path, &site)?;
            cmd::watch::run(config).await?;
        }
        Commands::Check { site, strict } => {
            let config = cmd::load_config(config_path, &site)?;
            cmd::check::run(config, strict)?;
        }
    }

    Ok(())
}
