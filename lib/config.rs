//! Configuration file support.
//!
//! The configuration is an optional TOML file. Every section and key is
//! optional; missing values fall back to the defaults in [`crate::constants`].
//! Command-line flags take precedence over anything loaded here.

use crate::constants::{
    CONFIG_ENV, DEFAULT_BINARY_PATTERN, DEFAULT_BOOTLOADER_PATTERN, DEFAULT_BUILD_PREFIX,
    DEFAULT_CONFIG_PATH, DEFAULT_DEDUPE_SKIP, DEFAULT_HOMEPAGE, DEFAULT_IMAGE_PATTERN,
    DEFAULT_MANIFEST_NAME, DEFAULT_MANIFEST_VERSION, DEFAULT_RELOCATE_TARGET, MANIFEST_FILE,
};
use crate::error::{FwError, FwResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory used when none is given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Settings for `fwkit manifest`.
    pub manifest: ManifestConfig,

    /// Settings for `fwkit dedupe`.
    pub dedupe: DedupeConfig,

    /// Settings for `fwkit timestamps`.
    pub timestamps: TimestampsConfig,

    /// Settings for `fwkit relocate`.
    pub relocate: RelocateConfig,
}

/// `[manifest]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Name written at the top of the manifest.
    pub name: String,

    /// Version written at the top of the manifest.
    pub version: String,

    /// Homepage written at the top of the manifest.
    pub homepage: String,

    /// Glob matched against file names during discovery.
    pub pattern: String,

    /// Name of the per-folder descriptor file.
    pub descriptor: String,

    /// Name of the generated file inside the root.
    pub output: String,
}

/// `[dedupe]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupeConfig {
    /// Glob for the image compared between main folders.
    pub pattern: String,

    /// Main folder names that are never considered.
    pub skip: Vec<String>,
}

/// `[timestamps]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampsConfig {
    /// Glob for the bootloader image whose creation time is compared.
    pub pattern: String,
}

/// `[relocate]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelocateConfig {
    /// Subfolder that build output is packed into.
    pub target: String,

    /// Prefix identifying build output directories.
    pub prefix: String,
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MANIFEST_NAME.to_string(),
            version: DEFAULT_MANIFEST_VERSION.to_string(),
            homepage: DEFAULT_HOMEPAGE.to_string(),
            pattern: DEFAULT_BINARY_PATTERN.to_string(),
            descriptor: MANIFEST_FILE.to_string(),
            output: MANIFEST_FILE.to_string(),
        }
    }
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_IMAGE_PATTERN.to_string(),
            skip: DEFAULT_DEDUPE_SKIP.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for TimestampsConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_BOOTLOADER_PATTERN.to_string(),
        }
    }
}

impl Default for RelocateConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_RELOCATE_TARGET.to_string(),
            prefix: DEFAULT_BUILD_PREFIX.to_string(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Config {
    /// Load the configuration.
    ///
    /// Lookup order: the explicit path, then `FWKIT_CONFIG`, then the default
    /// location. An explicitly named file must exist; the default location is
    /// only read when present.
    pub fn load(explicit: Option<&Path>) -> FwResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV)
            && !path.is_empty()
        {
            return Self::from_file(Path::new(&path));
        }

        if DEFAULT_CONFIG_PATH.is_file() {
            return Self::from_file(&DEFAULT_CONFIG_PATH);
        }

        tracing::debug!("no configuration file, using defaults");
        Ok(Self::default())
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> FwResult<Self> {
        tracing::debug!(path = %path.display(), "loading configuration");
        let content = std::fs::read_to_string(path).map_err(|e| FwError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| FwError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> FwResult<Self> {
        Ok(toml::from_str(content)?)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
