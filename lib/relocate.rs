//! Build output relocation.
//!
//! Arduino-style builds leave `build*` directories inside each project
//! folder. Relocation packs a build directory's contents into the board
//! subfolder, renames the build directory with a random suffix and moves it
//! next to the project folders. Project folders left without files are
//! removed.
//!
//! Work is split into [`plan_relocation`], which only reads the tree, and
//! [`apply_plan`], which performs the moves.

use crate::error::FwResult;
use crate::scan::{dir_has_any_files, file_name_of, main_folders, sorted_walk};
use rand::Rng;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Options for planning a relocation.
#[derive(Debug, Clone)]
pub struct RelocateOptions {
    /// Board subfolder build output is packed into.
    pub target: String,

    /// Prefix identifying build directories.
    pub prefix: String,

    /// Length of the random suffix.
    pub suffix_len: usize,
}

/// One filesystem step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocateAction {
    /// Create the board subfolder inside a build directory.
    CreateTarget { path: PathBuf },

    /// Move a build directory entry into the board subfolder, replacing an
    /// existing entry of the same name.
    Pack { from: PathBuf, to: PathBuf },

    /// Rename a build directory and move it into the root.
    MoveUp { from: PathBuf, to: PathBuf },

    /// Delete a main folder that holds no files.
    RemoveEmpty { path: PathBuf },
}

/// Steps for one main folder, applied as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderPlan {
    pub main_folder: PathBuf,
    pub actions: Vec<RelocateAction>,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Plan the relocation of every main folder that has build directories.
pub fn plan_relocation(
    root: &Path,
    options: &RelocateOptions,
    rng: &mut impl Rng,
) -> FwResult<Vec<FolderPlan>> {
    let mut reserved = HashSet::new();
    let mut plans = Vec::new();

    for main_folder in main_folders(root)? {
        let build_dirs = build_dirs(&main_folder, &options.prefix)?;
        if build_dirs.is_empty() {
            continue;
        }

        let mut actions = Vec::new();
        let mut moved_out = Vec::new();

        for build_dir in build_dirs {
            let target = build_dir.join(&options.target);
            if !target.is_dir() {
                actions.push(RelocateAction::CreateTarget {
                    path: target.clone(),
                });
            }

            for entry in sorted_entries(&build_dir)? {
                let name = file_name_of(&entry);
                if name == options.target {
                    continue;
                }
                actions.push(RelocateAction::Pack {
                    to: target.join(&name),
                    from: entry,
                });
            }

            // Everything inside the build directory ends up in the target.
            if dir_has_any_files(&build_dir) {
                let to = unique_destination(root, &build_dir, options.suffix_len, rng, &mut reserved);
                actions.push(RelocateAction::MoveUp {
                    from: build_dir.clone(),
                    to,
                });
                moved_out.push(build_dir);
            } else {
                tracing::debug!(path = %build_dir.display(), "build directory has no files, leaving it");
            }
        }

        let keeps_files = sorted_walk(&main_folder)
            .filter(|e| e.file_type().is_file())
            .any(|e| !moved_out.iter().any(|dir| e.path().starts_with(dir)));
        if !keeps_files {
            actions.push(RelocateAction::RemoveEmpty {
                path: main_folder.clone(),
            });
        }

        plans.push(FolderPlan {
            main_folder,
            actions,
        });
    }

    Ok(plans)
}

/// Perform the steps of one folder plan in order.
pub fn apply_plan(plan: &FolderPlan) -> FwResult<()> {
    for action in &plan.actions {
        match action {
            RelocateAction::CreateTarget { path } => std::fs::create_dir_all(path)?,
            RelocateAction::Pack { from, to } => {
                if to.is_dir() {
                    std::fs::remove_dir_all(to)?;
                } else if to.exists() {
                    std::fs::remove_file(to)?;
                }
                std::fs::rename(from, to)?;
            }
            RelocateAction::MoveUp { from, to } => std::fs::rename(from, to)?,
            RelocateAction::RemoveEmpty { path } => {
                if dir_has_any_files(path) {
                    tracing::warn!(path = %path.display(), "folder gained files, not removing it");
                    continue;
                }
                std::fs::remove_dir_all(path)?;
            }
        }
        tracing::debug!(?action, "applied");
    }

    Ok(())
}

/// Direct subdirectories of `main_folder` whose name starts with `prefix`.
fn build_dirs(main_folder: &Path, prefix: &str) -> FwResult<Vec<PathBuf>> {
    Ok(sorted_entries(main_folder)?
        .into_iter()
        .filter(|p| p.is_dir() && file_name_of(p).starts_with(prefix))
        .collect())
}

fn sorted_entries(dir: &Path) -> FwResult<Vec<PathBuf>> {
    let mut entries = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();
    Ok(entries)
}

/// `<root>/<build name>_<suffix>` that neither exists nor is already planned.
fn unique_destination(
    root: &Path,
    build_dir: &Path,
    suffix_len: usize,
    rng: &mut impl Rng,
    reserved: &mut HashSet<PathBuf>,
) -> PathBuf {
    let base = file_name_of(build_dir);
    loop {
        let candidate = root.join(format!("{}_{}", base, random_suffix(suffix_len, rng)));
        if !candidate.exists() && reserved.insert(candidate.clone()) {
            return candidate;
        }
    }
}

/// Random lowercase alphanumeric string.
pub fn random_suffix(len: usize, rng: &mut impl Rng) -> String {
    (0..len)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
