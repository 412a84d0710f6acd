//! Build timestamp correlation.
//!
//! Main folders produced by the same build run share the creation time of
//! their bootloader image. Grouping folders by that time shows which ones
//! came out of one run.

use crate::error::FwResult;
use crate::scan::{creation_time, file_name_of, find_first_match, main_folders, relative_posix};
use chrono::{DateTime, Utc};
use glob::Pattern;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The bootloader image found in one main folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootloaderRecord {
    /// Main folder name.
    pub folder: String,

    /// Absolute path of the image.
    pub path: PathBuf,

    /// Image path relative to the root, `/` separated.
    pub relative: String,

    /// Creation time (modification time where the platform has none).
    pub created: SystemTime,
}

/// Main folders whose bootloader images were created in the same second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampGroup {
    /// Shared creation time, truncated to whole seconds.
    pub created: DateTime<Utc>,

    /// Members in folder order.
    pub members: Vec<BootloaderRecord>,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Find the bootloader image of every main folder.
pub fn scan_bootloaders(root: &Path, pattern: &Pattern) -> FwResult<Vec<BootloaderRecord>> {
    let mut found = Vec::new();

    for folder in main_folders(root)? {
        let name = file_name_of(&folder);
        match find_first_match(&folder, pattern) {
            Some(path) => found.push((name, path)),
            None => tracing::debug!(folder = %name, pattern = %pattern, "no bootloader image found"),
        }
    }

    Ok(record_bootloaders(root, found))
}

/// Date each found image, skipping folders whose image cannot be read.
pub fn record_bootloaders(root: &Path, found: Vec<(String, PathBuf)>) -> Vec<BootloaderRecord> {
    found
        .into_iter()
        .filter_map(|(folder, path)| match creation_time(&path) {
            Ok(created) => Some(BootloaderRecord {
                relative: relative_posix(root, &path).unwrap_or_else(|| path.display().to_string()),
                created,
                folder,
                path,
            }),
            Err(e) => {
                tracing::warn!(folder = %folder, path = %path.display(), error = %e, "cannot read bootloader image, skipping folder");
                None
            }
        })
        .collect()
}

/// Groups of two or more folders sharing a creation second, oldest first.
pub fn group_by_creation_second(records: &[BootloaderRecord]) -> Vec<TimestampGroup> {
    let mut by_second: BTreeMap<i64, Vec<BootloaderRecord>> = BTreeMap::new();
    for record in records {
        let second = DateTime::<Utc>::from(record.created).timestamp();
        by_second.entry(second).or_default().push(record.clone());
    }

    by_second
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .filter_map(|(second, mut members)| {
            members.sort_by(|a, b| a.folder.cmp(&b.folder));
            Some(TimestampGroup {
                created: DateTime::from_timestamp(second, 0)?,
                members,
            })
        })
        .collect()
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::compile_pattern;
    use std::time::Duration;
    use tempfile::TempDir;

    fn record(folder: &str, millis: u64) -> BootloaderRecord {
        BootloaderRecord {
            folder: folder.to_string(),
            path: PathBuf::from(folder),
            relative: format!("{}/sketch.ino.bootloader.bin", folder),
            created: SystemTime::UNIX_EPOCH + Duration::from_millis(millis),
        }
    }

    #[test]
    fn test_scan_bootloaders() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for relative in [
            "b/build/sketch.ino.bootloader.bin",
            "a/sketch.ino.bootloader.bin",
            "a/sketch.ino.bin",
            "c/sketch.ino.bin",
        ] {
            let path = root.join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"boot").unwrap();
        }

        let pattern = compile_pattern("*.ino.bootloader.bin").unwrap();
        let records = scan_bootloaders(root, &pattern).unwrap();

        let found: Vec<_> = records
            .iter()
            .map(|r| (r.folder.as_str(), r.relative.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("a", "a/sketch.ino.bootloader.bin"),
                ("b", "b/build/sketch.ino.bootloader.bin"),
            ]
        );
    }

    #[test]
    fn test_unreadable_image_is_skipped() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("a")).unwrap();
        std::fs::write(root.join("a/sketch.ino.bootloader.bin"), b"boot").unwrap();

        let records = record_bootloaders(
            root,
            vec![
                ("a".to_string(), root.join("a/sketch.ino.bootloader.bin")),
                ("b".to_string(), root.join("b/gone.ino.bootloader.bin")),
            ],
        );

        let folders: Vec<_> = records.iter().map(|r| r.folder.as_str()).collect();
        assert_eq!(folders, vec!["a"]);
        assert_eq!(records[0].relative, "a/sketch.ino.bootloader.bin");
    }

    #[test]
    fn test_groups_share_a_second() {
        let records = vec![
            record("c", 5_000_100),
            record("a", 5_000_900),
            record("b", 7_000_000),
            record("d", 9_000_000),
            record("e", 9_000_999),
        ];

        let groups = group_by_creation_second(&records);
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].created.timestamp(), 5_000);
        let first: Vec<_> = groups[0].members.iter().map(|r| r.folder.as_str()).collect();
        assert_eq!(first, vec!["a", "c"]);

        assert_eq!(groups[1].created.timestamp(), 9_000);
        let second: Vec<_> = groups[1].members.iter().map(|r| r.folder.as_str()).collect();
        assert_eq!(second, vec!["d", "e"]);
    }

    #[test]
    fn test_unique_times_produce_no_group() {
        let records = vec![record("a", 1_000), record("b", 2_000)];
        assert!(group_by_creation_second(&records).is_empty());
    }
}
