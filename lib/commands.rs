//! CLI command definitions.

use crate::styles::styles;
use crate::{examples, examples_section};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const MANIFEST_EXAMPLES: &str = examples![
    "fwkit manifest ./firmware              " # "Write ./firmware/manifest.json",
    "fwkit manifest --stdout                " # "Print the manifest instead of writing it",
    "fwkit manifest -o release.json         " # "Write to a custom file",
    "fwkit manifest --pattern \"*.ino.bin\"   " # "Only pick up application images",
];

const DEDUPE_EXAMPLES: &str = examples![
    "fwkit dedupe ./firmware                " # "Report identical builds (dry run)",
    "fwkit dedupe --delete                  " # "Delete duplicates after confirmation",
    "fwkit dedupe --delete -y               " # "Delete duplicates without asking",
    "fwkit dedupe --pattern \"*.merged.bin\"  " # "Compare merged images instead",
];

const TIMESTAMPS_EXAMPLES: &str = examples![
    "fwkit timestamps ./firmware            " # "Find folders built in the same second",
    "fwkit timestamps --pattern \"*.bin\"     " # "Compare another image",
];

const RELOCATE_EXAMPLES: &str = examples![
    "fwkit relocate ./firmware --dry-run    " # "Show what would move",
    "fwkit relocate ./firmware              " # "Pack and move build output",
    "fwkit relocate --target esp32.esp32.esp32" # "Pack into another board folder",
    "fwkit relocate --prefix out            " # "Handle out* directories",
];

const CLI_EXAMPLES: &str = concat!(
    examples![
        "fwkit manifest ./firmware              " # "Generate the release manifest",
        "fwkit dedupe ./firmware                " # "Find identical builds",
        "fwkit timestamps ./firmware            " # "Group builds by creation time",
        "fwkit relocate ./firmware --dry-run    " # "Preview build output relocation",
    ],
    "\n\n",
    examples_section!["Root directory:";
        "FWKIT_ROOT=./firmware fwkit manifest   " # "Root from the environment",
        "fwkit --config fwkit.toml manifest     " # "Root and defaults from a config file",
        "fwkit manifest                         " # "Prompt for the root",
    ],
);

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// fwkit - Firmware release maintenance.
#[derive(Debug, Parser)]
#[command(name = "fwkit", author, version, styles=styles())]
#[command(about = "Maintain firmware release directories", after_help = CLI_EXAMPLES)]
pub struct Cli {
    /// Configuration file (default: FWKIT_CONFIG or the user config directory).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show debug logs.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate the release manifest for a firmware directory.
    #[command(after_help = MANIFEST_EXAMPLES)]
    Manifest {
        /// Firmware root directory.
        root: Option<String>,

        /// Output file (default: <ROOT>/manifest.json).
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print the manifest to stdout instead of writing a file.
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Glob matched against file names.
        #[arg(long, value_name = "GLOB")]
        pattern: Option<String>,
    },

    /// Find main folders holding identical images.
    #[command(after_help = DEDUPE_EXAMPLES)]
    Dedupe {
        /// Firmware root directory.
        root: Option<String>,

        /// Glob for the compared image.
        #[arg(long, value_name = "GLOB")]
        pattern: Option<String>,

        /// Delete duplicate folders, keeping the oldest of each group.
        #[arg(long)]
        delete: bool,

        /// Skip the confirmation prompt.
        #[arg(short, long, requires = "delete")]
        yes: bool,
    },

    /// Group main folders by bootloader creation time.
    #[command(after_help = TIMESTAMPS_EXAMPLES)]
    Timestamps {
        /// Firmware root directory.
        root: Option<String>,

        /// Glob for the bootloader image.
        #[arg(long, value_name = "GLOB")]
        pattern: Option<String>,
    },

    /// Pack build output and move it up to the root.
    #[command(after_help = RELOCATE_EXAMPLES)]
    Relocate {
        /// Firmware root directory.
        root: Option<String>,

        /// Print the planned moves without touching the disk.
        #[arg(long)]
        dry_run: bool,

        /// Board subfolder build output is packed into.
        #[arg(long, value_name = "NAME")]
        target: Option<String>,

        /// Prefix identifying build directories.
        #[arg(long, value_name = "PREFIX")]
        prefix: Option<String>,
    },
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_manifest() {
        let cli = Cli::parse_from(["fwkit", "manifest", "./fw", "--stdout", "-v"]);
        assert!(cli.verbose);
        match cli.command {
            Command::Manifest {
                root,
                output,
                stdout,
                pattern,
            } => {
                assert_eq!(root.as_deref(), Some("./fw"));
                assert!(output.is_none());
                assert!(stdout);
                assert!(pattern.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_stdout_conflicts_with_output() {
        let result = Cli::try_parse_from(["fwkit", "manifest", "--stdout", "-o", "x.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_yes_requires_delete() {
        assert!(Cli::try_parse_from(["fwkit", "dedupe", "-y"]).is_err());

        let cli = Cli::try_parse_from(["fwkit", "dedupe", "--delete", "-y"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Dedupe {
                delete: true,
                yes: true,
                ..
            }
        ));
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from(["fwkit", "relocate", "--dry-run", "--config", "fw.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("fw.toml")));
        assert!(matches!(cli.command, Command::Relocate { dry_run: true, .. }));
    }
}
