//! Release manifest type definitions.

use crate::constants::{APPLICATION_OFFSET, BOOTLOADER_OFFSET, MERGED_OFFSET, PARTITIONS_OFFSET};
use serde::{Deserialize, Serialize};
use std::fmt;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Kind of firmware segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartType {
    /// Single image with bootloader, partition table and application combined.
    Merged,
    /// Second stage bootloader.
    Bootloader,
    /// Partition table.
    Partitions,
    /// Application image.
    Application,
}

/// One firmware segment with its flash offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// Segment kind.
    #[serde(rename = "type")]
    pub part_type: PartType,

    /// Root-relative path, `./` prefixed, `/` separated.
    pub path: String,

    /// Flash offset in bytes.
    pub offset: u64,
}

/// Parts plus name and version for one top-level folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub name: String,
    pub version: String,
    pub parts: Vec<Part>,
}

/// The release manifest written to `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub homepage: String,
    pub builds: Vec<Build>,
}

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Keywords checked in priority order by [`PartType::detect`].
const DETECTION_ORDER: [PartType; 3] = [PartType::Merged, PartType::Bootloader, PartType::Partitions];

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl PartType {
    /// All part types.
    pub const ALL: [PartType; 4] = [
        PartType::Merged,
        PartType::Bootloader,
        PartType::Partitions,
        PartType::Application,
    ];

    /// Detect the part type from a file name.
    ///
    /// The first keyword contained in the name wins (`merged`, then
    /// `bootloader`, then `partitions`), ignoring case. Anything else is an
    /// application image.
    pub fn detect(file_name: &str) -> Self {
        let name = file_name.to_lowercase();
        DETECTION_ORDER
            .into_iter()
            .find(|t| name.contains(t.keyword()))
            .unwrap_or(PartType::Application)
    }

    /// Parse an explicit type keyword, ignoring case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.keyword() == keyword)
    }

    /// Keyword used in file names and in the manifest.
    pub fn keyword(&self) -> &'static str {
        match self {
            PartType::Merged => "merged",
            PartType::Bootloader => "bootloader",
            PartType::Partitions => "partitions",
            PartType::Application => "application",
        }
    }

    /// Flash offset used when none is given explicitly.
    pub fn default_offset(&self) -> u64 {
        match self {
            PartType::Merged => MERGED_OFFSET,
            PartType::Bootloader => BOOTLOADER_OFFSET,
            PartType::Partitions => PARTITIONS_OFFSET,
            PartType::Application => APPLICATION_OFFSET,
        }
    }
}

impl Part {
    /// Create a part at the type's default offset.
    pub fn with_default_offset(part_type: PartType, path: impl Into<String>) -> Self {
        Self {
            part_type,
            path: path.into(),
            offset: part_type.default_offset(),
        }
    }
}

impl Manifest {
    /// Serialize with two-space indentation and a trailing newline.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_keywords() {
        assert_eq!(PartType::detect("sketch.ino.merged.bin"), PartType::Merged);
        assert_eq!(PartType::detect("sketch.ino.bootloader.bin"), PartType::Bootloader);
        assert_eq!(PartType::detect("sketch.ino.partitions.bin"), PartType::Partitions);
        assert_eq!(PartType::detect("sketch.ino.bin"), PartType::Application);
        assert_eq!(PartType::detect(""), PartType::Application);
    }

    #[test]
    fn test_detect_is_case_insensitive_and_priority_ordered() {
        assert_eq!(PartType::detect("Merged_Bootloader.bin"), PartType::Merged);
        assert_eq!(PartType::detect("BOOTLOADER_partitions.BIN"), PartType::Bootloader);
        assert_eq!(PartType::detect("Partitions.bin"), PartType::Partitions);
        assert_eq!(PartType::detect("fw/MERGED.bin"), PartType::Merged);
    }

    #[test]
    fn test_from_keyword() {
        assert_eq!(PartType::from_keyword("Bootloader"), Some(PartType::Bootloader));
        assert_eq!(PartType::from_keyword("application"), Some(PartType::Application));
        assert_eq!(PartType::from_keyword(" MERGED "), Some(PartType::Merged));
        assert_eq!(PartType::from_keyword("ota_data"), None);
        assert_eq!(PartType::from_keyword(""), None);
    }

    #[test]
    fn test_default_offsets() {
        assert_eq!(PartType::Merged.default_offset(), 0);
        assert_eq!(PartType::Bootloader.default_offset(), 0);
        assert_eq!(PartType::Partitions.default_offset(), 32768);
        assert_eq!(PartType::Application.default_offset(), 65536);
    }

    #[test]
    fn test_part_serializes_type_field() {
        let part = Part::with_default_offset(PartType::Partitions, "./a/p.bin");
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "partitions", "path": "./a/p.bin", "offset": 32768 })
        );
    }
}
