//! Filesystem discovery.
//!
//! Every walk in fwkit goes through [`sorted_walk`], which visits directory
//! entries sorted by file name, depth-first. "The first file matching X" is
//! therefore the same on every platform and filesystem.

use crate::constants::ROOT_GROUP;
use crate::error::{FwError, FwResult};
use glob::Pattern;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use walkdir::{DirEntry, WalkDir};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Key of a binary group: the first path component below the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKey {
    /// Files that sit directly in the root.
    Root,
    /// Files below a top-level folder.
    Folder(String),
}

/// Binaries found below one top-level folder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinaryGroup {
    /// Directory the group lives in (the root itself for [`GroupKey::Root`]).
    pub dir: PathBuf,

    /// Matching files, sorted by their relative path.
    pub files: Vec<PathBuf>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl GroupKey {
    /// Display name of the group.
    pub fn name(&self) -> &str {
        match self {
            GroupKey::Root => ROOT_GROUP,
            GroupKey::Folder(name) => name,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            GroupKey::Root => 0,
            GroupKey::Folder(_) => 1,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name()
            .cmp(other.name())
            .then_with(|| self.rank().cmp(&other.rank()))
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Compile a file name glob.
pub fn compile_pattern(pattern: &str) -> FwResult<Pattern> {
    Ok(Pattern::new(pattern)?)
}

/// Walk `dir` recursively in sorted order, skipping unreadable entries.
pub fn sorted_walk(dir: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
}

/// Group every file below `root` whose name matches `pattern` by its
/// top-level folder.
pub fn collect_binaries(root: &Path, pattern: &Pattern) -> FwResult<BTreeMap<GroupKey, BinaryGroup>> {
    let mut groups: BTreeMap<GroupKey, BinaryGroup> = BTreeMap::new();

    for entry in sorted_walk(root) {
        if !entry.file_type().is_file() {
            continue;
        }
        if !pattern.matches(&entry.file_name().to_string_lossy()) {
            continue;
        }

        let relative = entry.path().strip_prefix(root)?;
        let mut components = relative.components();
        let first = components.next();
        let key = match (first, components.next()) {
            (Some(Component::Normal(top)), Some(_)) => {
                GroupKey::Folder(top.to_string_lossy().to_string())
            }
            _ => GroupKey::Root,
        };

        let group = groups.entry(key.clone()).or_insert_with(|| BinaryGroup {
            dir: match &key {
                GroupKey::Root => root.to_path_buf(),
                GroupKey::Folder(name) => root.join(name),
            },
            files: Vec::new(),
        });
        group.files.push(entry.into_path());
    }

    for group in groups.values_mut() {
        group
            .files
            .sort_by_cached_key(|path| relative_posix(root, path).unwrap_or_default());
    }

    tracing::debug!(groups = groups.len(), "collected binaries");
    Ok(groups)
}

/// Find the first file named `name` below `dir`.
pub fn find_file_recursively(dir: &Path, name: &str) -> Option<PathBuf> {
    sorted_walk(dir)
        .find(|e| e.file_type().is_file() && e.file_name().to_string_lossy() == name)
        .map(DirEntry::into_path)
}

/// Find the first file below `dir` whose name matches `pattern`.
pub fn find_first_match(dir: &Path, pattern: &Pattern) -> Option<PathBuf> {
    sorted_walk(dir)
        .find(|e| e.file_type().is_file() && pattern.matches(&e.file_name().to_string_lossy()))
        .map(DirEntry::into_path)
}

/// Whether `dir` contains at least one file at any depth.
pub fn dir_has_any_files(dir: &Path) -> bool {
    dir.is_dir() && sorted_walk(dir).any(|e| e.file_type().is_file())
}

/// Creation time of a file, falling back to its modification time.
pub fn creation_time(path: &Path) -> FwResult<SystemTime> {
    let metadata = std::fs::metadata(path)?;
    Ok(metadata.created().or_else(|_| metadata.modified())?)
}

/// Direct subdirectories of `root`, sorted by name, hidden ones excluded.
pub fn main_folders(root: &Path) -> FwResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(FwError::InvalidRoot(root.to_path_buf()));
    }

    let mut folders = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        folders.push(entry.path());
    }
    folders.sort();

    Ok(folders)
}

/// Path of `path` relative to `root` with `/` separators.
///
/// Returns `None` when `path` is not inside `root`.
pub fn relative_posix(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    Some(posix_string(relative))
}

/// Path as it appears in a release manifest: `./` plus the root-relative
/// path, or the absolute path in `/` form for files outside the root.
pub fn manifest_path(root: &Path, path: &Path) -> String {
    match relative_posix(root, path) {
        Some(relative) => format!("./{}", relative),
        None => path.to_string_lossy().replace('\\', "/"),
    }
}

/// Name of a path's final component, lossily converted.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn posix_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"\x00").unwrap();
    }

    #[test]
    fn test_group_key_ordering() {
        let mut keys = vec![
            GroupKey::Folder("zeta".into()),
            GroupKey::Folder("root".into()),
            GroupKey::Folder("alpha".into()),
            GroupKey::Root,
        ];
        keys.sort();
        let names: Vec<_> = keys.iter().map(|k| (k.name(), k.rank())).collect();
        assert_eq!(
            names,
            vec![("alpha", 1), ("root", 0), ("root", 1), ("zeta", 1)]
        );
    }

    #[test]
    fn test_collect_binaries_groups_by_top_folder() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "b/deep/nested/app.bin");
        touch(root, "b/boot.bin");
        touch(root, "a/x.bin");
        touch(root, "a/readme.txt");
        touch(root, "loose.bin");

        let pattern = compile_pattern("*.bin").unwrap();
        let groups = collect_binaries(root, &pattern).unwrap();

        let keys: Vec<_> = groups.keys().map(|k| k.name().to_string()).collect();
        assert_eq!(keys, vec!["a", "b", "root"]);

        let b = &groups[&GroupKey::Folder("b".into())];
        assert_eq!(b.dir, root.join("b"));
        let files: Vec<_> = b
            .files
            .iter()
            .map(|f| relative_posix(root, f).unwrap())
            .collect();
        assert_eq!(files, vec!["b/boot.bin", "b/deep/nested/app.bin"]);

        let loose = &groups[&GroupKey::Root];
        assert_eq!(loose.dir, root);
        assert_eq!(loose.files, vec![root.join("loose.bin")]);
    }

    #[test]
    fn test_find_file_recursively_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "b/fw.bin");
        touch(root, "a/z/fw.bin");

        assert_eq!(
            find_file_recursively(root, "fw.bin"),
            Some(root.join("a/z/fw.bin"))
        );
        assert_eq!(find_file_recursively(root, "missing.bin"), None);
    }

    #[test]
    fn test_find_first_match() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "build/sketch.ino.bootloader.bin");
        touch(root, "build/sketch.ino.bin");

        let pattern = compile_pattern("*.ino.bin").unwrap();
        assert_eq!(
            find_first_match(root, &pattern),
            Some(root.join("build/sketch.ino.bin"))
        );
    }

    #[test]
    fn test_dir_has_any_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("empty/nested")).unwrap();
        touch(root, "full/nested/file");

        assert!(!dir_has_any_files(&root.join("empty")));
        assert!(dir_has_any_files(&root.join("full")));
        assert!(!dir_has_any_files(&root.join("missing")));
    }

    #[test]
    fn test_main_folders_skips_hidden_and_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("b")).unwrap();
        std::fs::create_dir_all(root.join("a")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        touch(root, "file.bin");

        let folders = main_folders(root).unwrap();
        assert_eq!(folders, vec![root.join("a"), root.join("b")]);
    }

    #[test]
    fn test_manifest_path() {
        let root = Path::new("/fw");
        assert_eq!(
            manifest_path(root, Path::new("/fw/a/b/app.bin")),
            "./a/b/app.bin"
        );
        assert_eq!(
            manifest_path(root, Path::new("/elsewhere/app.bin")),
            "/elsewhere/app.bin"
        );
    }
}
