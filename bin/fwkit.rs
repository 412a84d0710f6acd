//! `fwkit` is the firmware release maintenance CLI.

use clap::Parser;
use colored::Colorize;
use fwkit::handlers::{self, DedupeOptions, ManifestOptions, RelocateCommandOptions};
use fwkit::{Cli, Command, Config, FwError, FwResult};
use tracing_subscriber::EnvFilter;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print an error with appropriate formatting based on error type.
fn print_error(e: &FwError) {
    println!();
    match e {
        FwError::InvalidRoot(path) => {
            println!("  {} Not a directory", "error".bright_red().bold());
            println!();
            println!("    {}: {}", "Root".dimmed(), path.display());
        }
        FwError::NoRootSelected => {
            println!("  {} No root directory selected", "error".bright_red().bold());
            println!();
            println!(
                "    {}: Pass a directory, set {} or add {} to the config file",
                "hint".bright_blue().bold(),
                "FWKIT_ROOT".bright_white(),
                "root = \"...\"".bright_white()
            );
        }
        FwError::ConfigLoad { path, reason } => {
            println!(
                "  {} Failed to load configuration",
                "error[config]".bright_red().bold()
            );
            println!();
            println!("    {}: {}", "File".dimmed(), path.display());
            for line in reason.lines().filter(|l| !l.trim().is_empty()) {
                println!("    {}", line);
            }
        }
        FwError::Cancelled => {
            println!("  {} Operation cancelled", "✗".bright_red());
        }
        _ => {
            let msg = e.to_string();
            match msg.split_once(": ") {
                Some((prefix, rest)) if prefix.ends_with("error") => {
                    println!(
                        "  {} {}",
                        format!("error[{}]", prefix.to_lowercase().replace(" error", ""))
                            .bright_red()
                            .bold(),
                        rest.dimmed()
                    );
                }
                _ => println!("  {} {}", "error".bright_red().bold(), msg),
            }
        }
    }
    println!();
}

/// Initialize tracing. Only enables logging when RUST_LOG is set or `-v` is given.
fn init_tracing(verbose: bool) {
    let rust_log = std::env::var("RUST_LOG").ok().filter(|s| !s.is_empty());

    let env_filter = match (rust_log, verbose) {
        (Some(_), _) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        (None, true) => EnvFilter::new("fwkit=debug"),
        (None, false) => return,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> FwResult<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Manifest {
            root,
            output,
            stdout,
            pattern,
        } => handlers::generate_manifest(
            root,
            ManifestOptions {
                output,
                stdout,
                pattern,
            },
            &config,
        ),

        Command::Dedupe {
            root,
            pattern,
            delete,
            yes,
        } => handlers::dedupe_folders(
            root,
            DedupeOptions {
                pattern,
                delete,
                yes,
            },
            &config,
        ),

        Command::Timestamps { root, pattern } => {
            handlers::report_timestamps(root, pattern, &config)
        }

        Command::Relocate {
            root,
            dry_run,
            target,
            prefix,
        } => handlers::relocate_builds(
            root,
            RelocateCommandOptions {
                dry_run,
                target,
                prefix,
            },
            &config,
        ),
    }
}
