//! Check command - validate configuration and the source tree

use std::collections::BTreeMap;

use color_eyre::eyre::{Result, bail};
use quire_core::{Category, Config, relative_slash_path};
use quire_generator::{SiteBuilder, documents};
use walkdir::WalkDir;

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
pub fn run(config: Config, strict: bool) -> Result<()> {
    tracing::info!(strict, "Checking configuration and source tree");

    let mut result = ValidationResult::default();

    println!("Checking directories...");
    match config.validate_paths() {
        Ok(()) => println!("  ✓ Directories valid"),
        Err(e) => {
            println!("  ✗ {e}");
            result.add_error(e.to_string());
        }
    }

    let builder = SiteBuilder::new(config);

    if !builder.config().documents.dirs.is_empty() {
        println!("\nChecking document directories...");
        check_documents(&builder, &mut result);
    }

    if builder.source_dir().is_dir() {
        println!("\nClassifying source files...");
        for (category, count) in count_categories(&builder) {
            println!("  {:<9} {count}", format!("{category}:"));
        }
    }

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

fn check_documents(builder: &SiteBuilder, result: &mut ValidationResult) {
    for dir in &builder.config().documents.dirs {
        let module = documents::module_for(dir);
        if builder.config().source_path(&module).is_file() {
            println!("  ✓ {dir} uses {module}");
        } else {
            println!("  ✗ {dir} has no {module}");
            result.add_error(format!(
                "No template '{module}' has been found for document directory '{dir}'"
            ));
        }

        if !builder.config().source_path(dir).is_dir() {
            result.add_warning(format!("Document directory '{dir}' does not exist"));
        }
    }
}

/// Count source files per category, skipping a nested output directory.
fn count_categories(builder: &SiteBuilder) -> BTreeMap<Category, usize> {
    let mut counts: BTreeMap<Category, usize> = Category::ALL.iter().map(|c| (*c, 0)).collect();
    let root = builder.source_dir();

    let entries = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            relative_slash_path(root, e.path()).is_none_or(|rel| !builder.is_output(&rel))
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file());

    for entry in entries {
        if let Some(rel) = relative_slash_path(root, entry.path()) {
            *counts.entry(builder.classifier().classify(&rel)).or_default() += 1;
        }
    }

    counts
}
