//! Timestamp report command handler.

use crate::config::Config;
use crate::error::FwResult;
use crate::format::{format_datetime, plural};
use crate::scan::compile_pattern;
use crate::timestamps::{group_by_creation_second, scan_bootloaders};
use colored::Colorize;

use super::common::resolve_root;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Report main folders whose bootloader images share a creation second.
pub fn report_timestamps(
    root: Option<String>,
    pattern: Option<String>,
    config: &Config,
) -> FwResult<()> {
    let root = resolve_root(root, config)?;
    let pattern = compile_pattern(pattern.as_deref().unwrap_or(&config.timestamps.pattern))?;

    let records = scan_bootloaders(&root, &pattern)?;
    let groups = group_by_creation_second(&records);

    println!();
    if groups.is_empty() {
        println!(
            "  {} No folders share a bootloader creation time ({} scanned)",
            "-".dimmed(),
            plural(records.len(), "image", "images")
        );
        println!();
        return Ok(());
    }

    for group in &groups {
        println!(
            "  {} {}",
            format_datetime(group.created).bold(),
            plural(group.members.len(), "folder", "folders").dimmed()
        );
        for member in &group.members {
            println!(
                "    {} {}",
                format!("{:<24}", member.folder).bright_white(),
                member.relative.dimmed()
            );
        }
        println!();
    }

    Ok(())
}
