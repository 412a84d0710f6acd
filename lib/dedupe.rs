//! Duplicate build folder detection.
//!
//! Each main folder (a direct subdirectory of the root) is represented by the
//! first image matching the configured pattern. Folders whose images hash to
//! the same SHA-256 are duplicates; the one with the oldest image is kept.

use crate::error::FwResult;
use crate::scan::{creation_time, file_name_of, find_first_match, main_folders, relative_posix};
use glob::Pattern;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const HASH_CHUNK_SIZE: usize = 8192;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The image found in one main folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Main folder name.
    pub folder: String,

    /// Absolute path of the image.
    pub path: PathBuf,

    /// Image path relative to the root, `/` separated.
    pub relative: String,

    /// Creation time (modification time where the platform has none).
    pub created: SystemTime,

    /// Hex SHA-256 of the image contents.
    pub sha256: String,
}

/// Result of scanning the main folders.
#[derive(Debug, Default)]
pub struct ImageScan {
    /// Folders with an image, sorted by folder name.
    pub images: Vec<ImageRecord>,

    /// Folders without a matching image.
    pub missing: Vec<String>,

    /// Folders whose image could not be read.
    pub unreadable: Vec<String>,
}

/// Main folders sharing one image hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub sha256: String,

    /// Members sorted by folder name.
    pub members: Vec<ImageRecord>,
}

/// Which folders to keep and which to delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupePlan {
    pub keep: Vec<ImageRecord>,
    pub delete: Vec<ImageRecord>,
}

/// Outcome of deleting one folder.
#[derive(Debug)]
pub enum Deletion {
    /// The folder was removed.
    Removed(PathBuf),
    /// The folder no longer existed.
    Missing(PathBuf),
    /// Removing the folder failed.
    Failed { path: PathBuf, error: std::io::Error },
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl DedupePlan {
    /// Whether anything would be deleted.
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty()
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Find, hash and date the image of every main folder.
pub fn scan_images(root: &Path, pattern: &Pattern, skip: &[String]) -> FwResult<ImageScan> {
    let mut scan = ImageScan::default();
    let mut found = Vec::new();

    for folder in main_folders(root)? {
        let name = file_name_of(&folder);
        if skip.iter().any(|s| *s == name) {
            tracing::debug!(folder = %name, "skipping excluded folder");
            continue;
        }

        match find_first_match(&folder, pattern) {
            Some(path) => found.push((name, path)),
            None => {
                tracing::info!(folder = %name, pattern = %pattern, "no image found");
                scan.missing.push(name);
            }
        }
    }

    record_images(root, found, &mut scan);
    Ok(scan)
}

/// Hash and date each found image. A folder whose image cannot be read is
/// listed as unreadable and the rest are still recorded.
pub fn record_images(root: &Path, found: Vec<(String, PathBuf)>, scan: &mut ImageScan) {
    for (folder, path) in found {
        match read_image(root, &folder, &path) {
            Ok(record) => scan.images.push(record),
            Err(e) => {
                tracing::warn!(folder = %folder, path = %path.display(), error = %e, "cannot read image, skipping folder");
                scan.unreadable.push(folder);
            }
        }
    }
}

fn read_image(root: &Path, folder: &str, path: &Path) -> FwResult<ImageRecord> {
    Ok(ImageRecord {
        folder: folder.to_string(),
        relative: relative_posix(root, path).unwrap_or_else(|| path.display().to_string()),
        created: creation_time(path)?,
        sha256: file_sha256(path)?,
        path: path.to_path_buf(),
    })
}

/// Stream a file through SHA-256.
pub fn file_sha256(path: &Path) -> FwResult<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; HASH_CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Groups of two or more folders sharing an image hash, sorted by hash.
pub fn group_by_hash(images: &[ImageRecord]) -> Vec<DuplicateGroup> {
    let mut by_hash: BTreeMap<&str, Vec<ImageRecord>> = BTreeMap::new();
    for image in images {
        by_hash.entry(&image.sha256).or_default().push(image.clone());
    }

    by_hash
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(sha256, mut members)| {
            members.sort_by(|a, b| a.folder.cmp(&b.folder));
            DuplicateGroup {
                sha256: sha256.to_string(),
                members,
            }
        })
        .collect()
}

/// Keep the folder with the oldest image in each group (ties go to the
/// smaller folder name) and mark the rest for deletion.
pub fn plan_keep_oldest(groups: &[DuplicateGroup]) -> DedupePlan {
    let mut plan = DedupePlan::default();

    for group in groups {
        let mut members = group.members.clone();
        members.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.folder.cmp(&b.folder)));

        let mut members = members.into_iter();
        if let Some(oldest) = members.next() {
            plan.keep.push(oldest);
        }
        plan.delete.extend(members);
    }

    plan.keep.sort_by(|a, b| a.folder.cmp(&b.folder));
    plan.delete.sort_by(|a, b| a.folder.cmp(&b.folder));
    plan
}

/// Remove every main folder marked for deletion.
///
/// Failures are reported per folder and never stop the loop.
pub fn delete_folders(root: &Path, plan: &DedupePlan) -> Vec<Deletion> {
    let mut names: Vec<&str> = plan.delete.iter().map(|r| r.folder.as_str()).collect();
    names.sort_unstable();
    names.dedup();

    names
        .into_iter()
        .map(|name| {
            let path = root.join(name);
            if !path.is_dir() {
                tracing::warn!(path = %path.display(), "folder not found");
                return Deletion::Missing(path);
            }
            match std::fs::remove_dir_all(&path) {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "removed duplicate folder");
                    Deletion::Removed(path)
                }
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "failed to remove folder");
                    Deletion::Failed { path, error }
                }
            }
        })
        .collect()
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
