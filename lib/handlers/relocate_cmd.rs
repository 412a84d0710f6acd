//! Build relocation command handler.

use crate::config::Config;
use crate::constants::RELOCATE_SUFFIX_LEN;
use crate::error::{FwError, FwResult};
use crate::format::plural;
use crate::relocate::{FolderPlan, RelocateAction, RelocateOptions, apply_plan, plan_relocation};
use crate::scan::file_name_of;
use colored::Colorize;
use std::path::Path;

use super::common::{display_relative, resolve_root};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Flags of `fwkit relocate`.
#[derive(Debug, Clone, Default)]
pub struct RelocateCommandOptions {
    /// Print the plan only.
    pub dry_run: bool,

    /// Board subfolder overriding the configuration.
    pub target: Option<String>,

    /// Build directory prefix overriding the configuration.
    pub prefix: Option<String>,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Pack build directories and move them up to the root.
pub fn relocate_builds(
    root: Option<String>,
    options: RelocateCommandOptions,
    config: &Config,
) -> FwResult<()> {
    let root = resolve_root(root, config)?;
    let relocate_options = RelocateOptions {
        target: options
            .target
            .unwrap_or_else(|| config.relocate.target.clone()),
        prefix: options
            .prefix
            .unwrap_or_else(|| config.relocate.prefix.clone()),
        suffix_len: RELOCATE_SUFFIX_LEN,
    };

    let plans = plan_relocation(&root, &relocate_options, &mut rand::thread_rng())?;

    println!();
    if plans.is_empty() {
        println!(
            "  {} No {}* directories found",
            "-".dimmed(),
            relocate_options.prefix
        );
        println!();
        return Ok(());
    }

    let mut failed = 0;
    for plan in &plans {
        print_plan(&root, plan);

        if options.dry_run {
            continue;
        }

        match apply_plan(plan) {
            Ok(()) => println!("    {} done", "✓".bright_green()),
            Err(e) => {
                failed += 1;
                tracing::warn!(folder = %plan.main_folder.display(), error = %e, "relocation failed");
                println!("    {} {}", "✗".bright_red(), e.to_string().dimmed());
            }
        }
        println!();
    }

    if options.dry_run {
        println!(
            "  {} Dry run, nothing moved ({} planned)",
            "-".dimmed(),
            plural(plans.len(), "folder", "folders")
        );
        println!();
    }

    if failed > 0 {
        return Err(FwError::Generic(format!(
            "{} could not be relocated",
            plural(failed, "folder", "folders")
        )));
    }
    Ok(())
}

fn print_plan(root: &Path, plan: &FolderPlan) {
    println!("  {}", file_name_of(&plan.main_folder).bold());
    for action in &plan.actions {
        println!("    {}", describe(root, action));
    }
}

fn describe(root: &Path, action: &RelocateAction) -> String {
    match action {
        RelocateAction::CreateTarget { path } => {
            format!("{} {}", "create".bright_cyan(), display_relative(root, path))
        }
        RelocateAction::Pack { from, to } => format!(
            "{}   {} {} {}",
            "pack".bright_cyan(),
            display_relative(root, from),
            "→".dimmed(),
            display_relative(root, to)
        ),
        RelocateAction::MoveUp { from, to } => format!(
            "{}   {} {} {}",
            "move".bright_yellow(),
            display_relative(root, from),
            "→".dimmed(),
            display_relative(root, to)
        ),
        RelocateAction::RemoveEmpty { path } => {
            format!("{} {}", "remove".bright_red(), display_relative(root, path))
        }
    }
}
