//! Duplicate folder command handler.

use crate::config::Config;
use crate::dedupe::{
    DedupePlan, Deletion, DuplicateGroup, ImageScan, delete_folders, group_by_hash,
    plan_keep_oldest, scan_images,
};
use crate::error::{FwError, FwResult};
use crate::format::{format_system_time, plural, short_hash};
use crate::prompt::{confirm_action, is_interactive};
use crate::scan::compile_pattern;
use colored::Colorize;
use std::path::Path;

use super::common::{display_relative, resolve_root};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Flags of `fwkit dedupe`.
#[derive(Debug, Clone, Default)]
pub struct DedupeOptions {
    /// Image glob overriding the configuration.
    pub pattern: Option<String>,

    /// Actually remove duplicate folders.
    pub delete: bool,

    /// Skip the confirmation prompt.
    pub yes: bool,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Report main folders with identical images and optionally delete all but
/// the oldest of each group.
pub fn dedupe_folders(root: Option<String>, options: DedupeOptions, config: &Config) -> FwResult<()> {
    let root = resolve_root(root, config)?;
    let pattern = compile_pattern(
        options
            .pattern
            .as_deref()
            .unwrap_or(&config.dedupe.pattern),
    )?;

    let scan = scan_images(&root, &pattern, &config.dedupe.skip)?;
    print_images(&scan);

    let groups = group_by_hash(&scan.images);
    if groups.is_empty() {
        println!("  {} No duplicate images found", "✓".bright_green());
        println!();
        return Ok(());
    }
    print_groups(&groups);

    let plan = plan_keep_oldest(&groups);
    print_plan(&plan);

    if !options.delete {
        println!(
            "  {} Dry run, nothing deleted. Re-run with {} to remove {}.",
            "-".dimmed(),
            "--delete".bright_cyan(),
            plural(plan.delete.len(), "folder", "folders")
        );
        println!();
        return Ok(());
    }

    if !options.yes {
        if !is_interactive() {
            return Err(FwError::Generic(
                "Refusing to delete without confirmation, pass --yes".into(),
            ));
        }
        let question = format!("Delete {}?", plural(plan.delete.len(), "folder", "folders"));
        if !confirm_action(&question)? {
            println!("  {} Nothing deleted", "-".dimmed());
            println!();
            return Ok(());
        }
    }

    let outcomes = delete_folders(&root, &plan);
    report_deletions(&root, &outcomes)
}

fn print_images(scan: &ImageScan) {
    println!();
    println!("  {}", "Images".bold());
    for image in &scan.images {
        println!(
            "    {} {}  {}  {}",
            format!("{:<24}", image.folder).bright_white(),
            format_system_time(image.created).dimmed(),
            short_hash(&image.sha256).bright_cyan(),
            image.relative.dimmed()
        );
    }
    for folder in &scan.missing {
        println!(
            "    {} {}",
            format!("{:<24}", folder).dimmed(),
            "no image found".dimmed()
        );
    }
    for folder in &scan.unreadable {
        println!(
            "    {} {}",
            format!("{:<24}", folder).bright_yellow(),
            "image unreadable, skipped".dimmed()
        );
    }
    println!();
}

fn print_groups(groups: &[DuplicateGroup]) {
    println!("  {}", "Duplicates".bold());
    for group in groups {
        println!("    {}", short_hash(&group.sha256).bright_cyan());
        for member in &group.members {
            println!(
                "      {} {}",
                format!("{:<24}", member.folder),
                format_system_time(member.created).dimmed()
            );
        }
    }
    println!();
}

fn print_plan(plan: &DedupePlan) {
    for kept in &plan.keep {
        println!("  {} keep   {}", "✓".bright_green(), kept.folder);
    }
    for deleted in &plan.delete {
        println!("  {} delete {}", "✗".bright_red(), deleted.folder);
    }
    println!();
}

fn report_deletions(root: &Path, outcomes: &[Deletion]) -> FwResult<()> {
    let mut failed = 0;

    for outcome in outcomes {
        match outcome {
            Deletion::Removed(path) => {
                println!(
                    "  {} Removed {}",
                    "✓".bright_green(),
                    display_relative(root, path)
                );
            }
            Deletion::Missing(path) => {
                println!(
                    "  {} {} no longer exists",
                    "-".dimmed(),
                    display_relative(root, path)
                );
            }
            Deletion::Failed { path, error } => {
                failed += 1;
                println!(
                    "  {} Failed to remove {}: {}",
                    "✗".bright_red(),
                    display_relative(root, path),
                    error.to_string().dimmed()
                );
            }
        }
    }
    println!();

    if failed > 0 {
        return Err(FwError::Generic(format!(
            "{} could not be removed",
            plural(failed, "folder", "folders")
        )));
    }
    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
