//! Build command implementation

use std::time::Instant;

use color_eyre::eyre::{Result, WrapErr};
use quire_core::Config;
use quire_generator::SiteBuilder;
use tracing::info;

/// Run the build command.
pub fn run(config: Config) -> Result<()> {
    let start = Instant::now();

    config.validate_paths()?;

    info!(
        source = %config.build.source_dir.display(),
        output = %config.build.output_dir.display(),
        "building site"
    );

    let builder = SiteBuilder::new(config);
    let stats = builder.build().wrap_err("Build failed")?;

    let duration = start.elapsed();
    println!("Build complete!");
    println!("  Pages:     {}", stats.pages);
    println!("  Documents: {}", stats.documents);
    println!("  Assets:    {}", stats.assets);
    println!("  Output:    {}", builder.output_dir().display());
    println!("  Duration:  {:.2}s", duration.as_secs_f64());

    Ok(())
}
