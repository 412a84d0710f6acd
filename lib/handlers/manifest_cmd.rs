//! Manifest generation command handler.

use crate::config::Config;
use crate::error::FwResult;
use crate::format::{format_offset, plural};
use crate::manifest::{Manifest, build_manifest, write_manifest};
use colored::Colorize;
use std::path::{Path, PathBuf};

use super::common::{display_relative, resolve_root};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Flags of `fwkit manifest`.
#[derive(Debug, Clone, Default)]
pub struct ManifestOptions {
    /// Output file; defaults to the configured name inside the root.
    pub output: Option<PathBuf>,

    /// Print the manifest instead of writing it.
    pub stdout: bool,

    /// File name glob overriding the configuration.
    pub pattern: Option<String>,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Generate the release manifest for a root directory.
pub fn generate_manifest(
    root: Option<String>,
    options: ManifestOptions,
    config: &Config,
) -> FwResult<()> {
    let root = resolve_root(root, config)?;

    let mut manifest_config = config.manifest.clone();
    if let Some(pattern) = options.pattern {
        manifest_config.pattern = pattern;
    }

    let manifest = build_manifest(&root, &manifest_config)?;

    if options.stdout {
        print!("{}", manifest.to_pretty_json()?);
        return Ok(());
    }

    let output = options
        .output
        .unwrap_or_else(|| root.join(&manifest_config.output));
    write_manifest(&output, &manifest)?;

    print_summary(&root, &output, &manifest);
    Ok(())
}

fn print_summary(root: &Path, output: &Path, manifest: &Manifest) {
    println!();

    if manifest.builds.is_empty() {
        println!(
            "  {} No firmware images found in {}",
            "-".dimmed(),
            root.display().to_string().bold()
        );
    }

    for build in &manifest.builds {
        println!(
            "  {} {} {}",
            "✓".bright_green(),
            build.name.bold(),
            build.version.dimmed()
        );
        for part in &build.parts {
            println!(
                "      {} {}  {}",
                format!("{:<12}", part.part_type.to_string()).bright_cyan(),
                format!("{:>9}", format_offset(part.offset)).dimmed(),
                part.path
            );
        }
    }

    println!();
    println!(
        "  Wrote {} ({})",
        display_relative(root, output).bold(),
        plural(manifest.builds.len(), "build", "builds")
    );
    println!();
}
