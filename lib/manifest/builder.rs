//! Release manifest assembly.

use super::descriptor::{FolderOverride, read_folder_descriptor};
use super::types::{Build, Manifest, Part, PartType};
use crate::config::ManifestConfig;
use crate::constants::{BINARY_EXT, FALLBACK_VERSION_START};
use crate::error::{FwError, FwResult};
use crate::scan::{BinaryGroup, GroupKey, collect_binaries, compile_pattern, file_name_of, manifest_path};
use semver::Version;
use std::path::{Path, PathBuf};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Version handed to builds that do not declare one.
///
/// Threaded through the assembly loop by value: every build that takes the
/// current version returns the bumped accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackVersion(Version);

/// Auto-detected parts bucketed by type, buckets in order of first appearance.
pub type AutoParts = Vec<(PartType, Vec<Part>)>;

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl FallbackVersion {
    /// Start at `0.0.0`.
    pub fn new() -> Self {
        let (major, minor, patch) = FALLBACK_VERSION_START;
        Self(Version::new(major, minor, patch))
    }

    /// The version the next fallback build receives.
    pub fn current(&self) -> String {
        self.0.to_string()
    }

    /// Advance the patch component.
    pub fn bump(self) -> Self {
        Self(Version::new(self.0.major, self.0.minor, self.0.patch + 1))
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for FallbackVersion {
    fn default() -> Self {
        Self::new()
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Build the release manifest for `root`.
///
/// The only error conditions are an invalid root and an invalid discovery
/// pattern; everything folder- or file-level degrades to skipping.
pub fn build_manifest(root: &Path, config: &ManifestConfig) -> FwResult<Manifest> {
    let root = canonical_root(root)?;
    let pattern = compile_pattern(&config.pattern)?;
    let groups = collect_binaries(&root, &pattern)?;

    let mut fallback = FallbackVersion::new();
    let mut builds = Vec::with_capacity(groups.len());

    for (key, group) in &groups {
        let (build, next) = assemble_build(key, group, &root, &config.descriptor, fallback);
        fallback = next;

        match build {
            Some(build) => {
                tracing::debug!(
                    group = %key,
                    name = %build.name,
                    version = %build.version,
                    parts = build.parts.len(),
                    "assembled build"
                );
                builds.push(build);
            }
            None => tracing::info!(group = %key, "no usable parts, skipping folder"),
        }
    }

    Ok(Manifest {
        name: config.name.clone(),
        version: config.version.clone(),
        homepage: config.homepage.clone(),
        builds,
    })
}

/// Assemble the build for one group.
///
/// Returns the build (if the group yields any parts) and the fallback version
/// to use for the next group.
pub fn assemble_build(
    key: &GroupKey,
    group: &BinaryGroup,
    root: &Path,
    descriptor: &str,
    fallback: FallbackVersion,
) -> (Option<Build>, FallbackVersion) {
    let folder_override = read_folder_descriptor(&group.dir, root, descriptor);
    let FolderOverride {
        name,
        version,
        parts: override_parts,
    } = folder_override.unwrap_or_default();

    let parts = merge_parts(override_parts, auto_detect_parts(&group.files, root));
    if parts.is_empty() {
        return (None, fallback);
    }

    let name = name.unwrap_or_else(|| key.name().to_string());
    let (version, fallback) = match version {
        Some(version) => (version, fallback),
        None => (fallback.current(), fallback.bump()),
    };

    (Some(Build { name, version, parts }), fallback)
}

/// Detect a part for every `.bin` file, typed by its name.
pub fn auto_detect_parts(files: &[PathBuf], root: &Path) -> AutoParts {
    let mut buckets: AutoParts = Vec::new();

    for file in files {
        let is_binary = file
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(BINARY_EXT));
        if !is_binary {
            continue;
        }

        let part_type = PartType::detect(&file_name_of(file));
        let part = Part::with_default_offset(part_type, manifest_path(root, file));

        match buckets.iter_mut().find(|(t, _)| *t == part_type) {
            Some((_, parts)) => parts.push(part),
            None => buckets.push((part_type, vec![part])),
        }
    }

    buckets
}

/// Override parts first, then every auto bucket whose type the override does
/// not already provide.
pub fn merge_parts(override_parts: Vec<Part>, auto_parts: AutoParts) -> Vec<Part> {
    let provided: Vec<PartType> = override_parts.iter().map(|p| p.part_type).collect();

    let mut merged = override_parts;
    for (part_type, parts) in auto_parts {
        if !provided.contains(&part_type) {
            merged.extend(parts);
        }
    }

    merged
}

/// Write a manifest to `path`.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> FwResult<()> {
    let json = manifest.to_pretty_json()?;
    std::fs::write(path, json)?;
    tracing::debug!(path = %path.display(), builds = manifest.builds.len(), "wrote manifest");
    Ok(())
}

/// Check that `root` is a directory and return its canonical form.
pub fn canonical_root(root: &Path) -> FwResult<PathBuf> {
    if !root.is_dir() {
        return Err(FwError::InvalidRoot(root.to_path_buf()));
    }
    Ok(root.canonicalize()?)
}
