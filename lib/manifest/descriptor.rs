//! Per-folder descriptor files.
//!
//! A top-level folder may carry a descriptor (by default `manifest.json`)
//! that lists its parts explicitly:
//!
//! ```json
//! {
//!   "name": "Board A",
//!   "version": "2.1.0",
//!   "parts": [
//!     { "type": "bootloader", "path": "build/boot.bin", "offset": "0x1000" },
//!     { "file": "app.bin" }
//!   ]
//! }
//! ```
//!
//! The document is validated against [`FolderDescriptor`]. A descriptor that
//! cannot be read or does not fit the schema is ignored as a whole; an entry
//! that does not fit [`PartEntry`] or cannot be resolved is dropped on its own.

use super::types::{Part, PartType};
use crate::scan::{file_name_of, find_file_recursively, manifest_path};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Schema of a descriptor file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FolderDescriptor {
    /// Build name.
    #[serde(default)]
    pub name: Option<String>,

    /// Build version.
    #[serde(default)]
    pub version: Option<String>,

    /// Raw part entries, validated one by one.
    #[serde(default)]
    pub parts: Vec<serde_json::Value>,
}

/// Schema of one `parts` entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartEntry {
    /// Explicit part type. Inferred from the file name when absent.
    #[serde(rename = "type", default)]
    pub part_type: Option<String>,

    /// File reference: a bare name, a folder-relative path or an absolute path.
    #[serde(default)]
    pub path: Option<String>,

    /// Alternative spelling of `path`.
    #[serde(default)]
    pub file: Option<String>,

    /// Explicit flash offset.
    #[serde(default)]
    pub offset: Option<OffsetValue>,
}

/// Flash offset as written in a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OffsetValue {
    /// `65536`
    Number(u64),
    /// `"65536"` or `"0x10000"`
    Text(String),
}

/// A descriptor after validation and normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderOverride {
    /// Build name, if given and non-empty.
    pub name: Option<String>,

    /// Build version, if given and non-empty.
    pub version: Option<String>,

    /// Parts whose files were found.
    pub parts: Vec<Part>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl OffsetValue {
    /// Numeric value, or `None` when the text is not a decimal or `0x` hex number.
    pub fn resolve(&self) -> Option<u64> {
        match self {
            OffsetValue::Number(n) => Some(*n),
            OffsetValue::Text(text) => {
                let text = text.trim();
                match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                    Some(hex) => u64::from_str_radix(hex, 16).ok(),
                    None => text.parse().ok(),
                }
            }
        }
    }
}

impl PartEntry {
    /// The file reference, preferring `path` over `file`.
    pub fn reference(&self) -> Option<&str> {
        non_empty(self.path.as_deref()).or_else(|| non_empty(self.file.as_deref()))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Read the descriptor named `file_name` directly inside `folder`.
///
/// Returns `None` when the file is absent, unreadable, or does not match the
/// schema.
pub fn read_folder_descriptor(folder: &Path, root: &Path, file_name: &str) -> Option<FolderOverride> {
    let path = folder.join(file_name);
    if !path.is_file() {
        return None;
    }

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read descriptor, ignoring it");
            return None;
        }
    };

    let descriptor: FolderDescriptor = match serde_json::from_str(&content) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid descriptor, ignoring it");
            return None;
        }
    };

    let parts = descriptor
        .parts
        .into_iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let entry: PartEntry = match serde_json::from_value(raw) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(path = %path.display(), index, error = %e, "dropping malformed part entry");
                    return None;
                }
            };
            let part = normalize_entry(&entry, folder, root);
            if part.is_none() {
                tracing::debug!(path = %path.display(), index, ?entry, "dropping unresolved part entry");
            }
            part
        })
        .collect();

    Some(FolderOverride {
        name: descriptor.name.filter(|s| !s.is_empty()),
        version: descriptor.version.filter(|s| !s.is_empty()),
        parts,
    })
}

/// Turn a descriptor entry into a [`Part`] pointing at an existing file.
///
/// Returns `None` when the entry has no file reference, names an unknown
/// type, carries an unparsable offset, or its file cannot be found.
pub fn normalize_entry(entry: &PartEntry, folder: &Path, root: &Path) -> Option<Part> {
    let reference = entry.reference()?;

    let part_type = match non_empty(entry.part_type.as_deref()) {
        Some(keyword) => PartType::from_keyword(keyword)?,
        None => PartType::detect(reference),
    };

    let resolved = resolve_reference(reference, folder)?;

    let offset = match &entry.offset {
        Some(value) => value.resolve()?,
        None => part_type.default_offset(),
    };

    if !resolved.starts_with(root) {
        tracing::warn!(
            path = %resolved.display(),
            root = %root.display(),
            "part lies outside the root, keeping absolute path"
        );
    }

    Some(Part {
        part_type,
        path: manifest_path(root, &resolved),
        offset,
    })
}

/// Locate the file a descriptor entry refers to.
fn resolve_reference(reference: &str, folder: &Path) -> Option<PathBuf> {
    let raw = Path::new(reference);
    let named_components = raw
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .count();

    if !raw.is_absolute() && named_components == 1 {
        return find_file_recursively(folder, &file_name_of(raw));
    }

    // Relative references stay under the folder path even when the folder
    // is a symlink; only absolute references are canonicalized.
    if raw.is_absolute() {
        if raw.is_file() {
            return Some(std::fs::canonicalize(raw).unwrap_or_else(|_| raw.to_path_buf()));
        }
    } else {
        let joined = normalize_lexically(&folder.join(raw));
        if joined.is_file() {
            return Some(joined);
        }
    }

    let name = file_name_of(raw);
    if name.is_empty() {
        return None;
    }
    find_file_recursively(folder, &name)
}

/// Drop `.` components and fold `..` into its parent without touching the
/// filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        for relative in [
            "board/build/sketch.ino.bootloader.bin",
            "board/build/sketch.ino.bin",
            "board/extra/custom.bin",
        ] {
            let path = root.join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"fw").unwrap();
        }
        (dir, root)
    }

    fn entry(json: serde_json::Value) -> PartEntry {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_offset_value_resolve() {
        assert_eq!(OffsetValue::Number(4096).resolve(), Some(4096));
        assert_eq!(OffsetValue::Text("32768".into()).resolve(), Some(32768));
        assert_eq!(OffsetValue::Text("0x8000".into()).resolve(), Some(32768));
        assert_eq!(OffsetValue::Text(" 0X10000 ".into()).resolve(), Some(65536));
        assert_eq!(OffsetValue::Text("-1".into()).resolve(), None);
        assert_eq!(OffsetValue::Text("boot".into()).resolve(), None);
    }

    #[test]
    fn test_negative_offset_does_not_fit_schema() {
        let result = serde_json::from_value::<PartEntry>(serde_json::json!({
            "path": "app.bin",
            "offset": -5
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_bare_name_is_searched_recursively() {
        let (_dir, root) = fixture();
        let folder = root.join("board");

        let part = normalize_entry(&entry(serde_json::json!({ "file": "custom.bin" })), &folder, &root)
            .unwrap();
        assert_eq!(part.part_type, PartType::Application);
        assert_eq!(part.path, "./board/extra/custom.bin");
        assert_eq!(part.offset, 65536);
    }

    #[test]
    fn test_type_inferred_from_reference() {
        let (_dir, root) = fixture();
        let folder = root.join("board");

        let part = normalize_entry(
            &entry(serde_json::json!({ "path": "build/sketch.ino.bootloader.bin" })),
            &folder,
            &root,
        )
        .unwrap();
        assert_eq!(part.part_type, PartType::Bootloader);
        assert_eq!(part.path, "./board/build/sketch.ino.bootloader.bin");
        assert_eq!(part.offset, 0);
    }

    #[test]
    fn test_explicit_offset_overrides_default() {
        let (_dir, root) = fixture();
        let folder = root.join("board");

        let part = normalize_entry(
            &entry(serde_json::json!({
                "type": "Bootloader",
                "path": "sketch.ino.bootloader.bin",
                "offset": 4096
            })),
            &folder,
            &root,
        )
        .unwrap();
        assert_eq!(part.part_type, PartType::Bootloader);
        assert_eq!(part.offset, 4096);

        let part = normalize_entry(
            &entry(serde_json::json!({ "path": "sketch.ino.bin", "offset": "0x20000" })),
            &folder,
            &root,
        )
        .unwrap();
        assert_eq!(part.offset, 0x20000);
    }

    #[test]
    fn test_missing_relative_path_falls_back_to_name_search() {
        let (_dir, root) = fixture();
        let folder = root.join("board");

        let part = normalize_entry(
            &entry(serde_json::json!({ "path": "old/location/custom.bin" })),
            &folder,
            &root,
        )
        .unwrap();
        assert_eq!(part.path, "./board/extra/custom.bin");
    }

    #[test]
    fn test_relative_path_is_normalized_under_folder() {
        let (_dir, root) = fixture();
        let folder = root.join("board");

        let part = normalize_entry(
            &entry(serde_json::json!({ "path": "./extra/../build/sketch.ino.bin" })),
            &folder,
            &root,
        )
        .unwrap();
        assert_eq!(part.path, "./board/build/sketch.ino.bin");
    }

    #[test]
    fn test_absolute_path_is_accepted() {
        let (_dir, root) = fixture();
        let folder = root.join("board");
        let absolute = root.join("board/build/sketch.ino.bin");

        let part = normalize_entry(
            &entry(serde_json::json!({ "path": absolute.to_string_lossy() })),
            &folder,
            &root,
        )
        .unwrap();
        assert_eq!(part.path, "./board/build/sketch.ino.bin");
    }

    #[test]
    fn test_absolute_path_outside_root_is_kept() {
        let (_dir, root) = fixture();
        let outside = TempDir::new().unwrap();
        let file = outside.path().canonicalize().unwrap().join("foreign.bin");
        std::fs::write(&file, b"fw").unwrap();

        let part = normalize_entry(
            &entry(serde_json::json!({ "path": file.to_string_lossy() })),
            &root.join("board"),
            &root,
        )
        .unwrap();
        assert_eq!(part.path, file.to_string_lossy().replace('\\', "/"));
    }

    #[test]
    fn test_unresolvable_entries_are_dropped() {
        let (_dir, root) = fixture();
        let folder = root.join("board");

        for json in [
            serde_json::json!({ "path": "nowhere.bin" }),
            serde_json::json!({ "path": "a/b/nowhere.bin" }),
            serde_json::json!({ "type": "ota_data", "path": "custom.bin" }),
            serde_json::json!({ "type": "bootloader" }),
            serde_json::json!({ "path": "", "file": "" }),
            serde_json::json!({ "path": "custom.bin", "offset": "boot" }),
        ] {
            assert_eq!(normalize_entry(&entry(json.clone()), &folder, &root), None, "{json}");
        }
    }

    #[test]
    fn test_read_missing_descriptor() {
        let (_dir, root) = fixture();
        assert_eq!(read_folder_descriptor(&root.join("board"), &root, "manifest.json"), None);
    }

    #[test]
    fn test_read_unparsable_descriptor() {
        let (_dir, root) = fixture();
        let folder = root.join("board");
        std::fs::write(folder.join("manifest.json"), "{ not json").unwrap();
        assert_eq!(read_folder_descriptor(&folder, &root, "manifest.json"), None);
    }

    #[test]
    fn test_read_descriptor_with_unknown_field() {
        let (_dir, root) = fixture();
        let folder = root.join("board");
        std::fs::write(
            folder.join("manifest.json"),
            r#"{ "name": "x", "homepage": "https://example.com", "builds": [] }"#,
        )
        .unwrap();
        assert_eq!(read_folder_descriptor(&folder, &root, "manifest.json"), None);
    }

    #[test]
    fn test_read_descriptor_drops_bad_entries() {
        let (_dir, root) = fixture();
        let folder = root.join("board");
        std::fs::write(
            folder.join("manifest.json"),
            r#"{
                "name": "Board",
                "version": "",
                "parts": [
                    { "type": "partitions", "file": "custom.bin", "offset": 36864 },
                    "not an object",
                    { "path": "missing.bin" },
                    { "path": "custom.bin", "colour": "red" }
                ]
            }"#,
        )
        .unwrap();

        let descriptor = read_folder_descriptor(&folder, &root, "manifest.json").unwrap();
        assert_eq!(descriptor.name.as_deref(), Some("Board"));
        assert_eq!(descriptor.version, None);
        assert_eq!(
            descriptor.parts,
            vec![Part {
                part_type: PartType::Partitions,
                path: "./board/extra/custom.bin".into(),
                offset: 36864,
            }]
        );
    }
}
