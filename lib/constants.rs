//! Constants for fwkit.
//!
//! Default file names, patterns and flash offsets. Everything that a user may
//! want to change is also exposed through the configuration file.

use std::path::PathBuf;
use std::sync::LazyLock;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Default manifest name written at the top of the release manifest.
pub const DEFAULT_MANIFEST_NAME: &str = "MOIRA UPDATER – THYMOS";

/// Default manifest version.
pub const DEFAULT_MANIFEST_VERSION: &str = "1.0.0";

/// Default manifest homepage.
pub const DEFAULT_HOMEPAGE: &str = "https://www.thymos.cz";

/// File name of both the generated manifest and the per-folder descriptor.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Glob for firmware images picked up by `fwkit manifest`.
pub const DEFAULT_BINARY_PATTERN: &str = "*.bin";

/// Extension of images that take part in auto-detection.
pub const BINARY_EXT: &str = "bin";

/// Glob for the application image compared by `fwkit dedupe`.
pub const DEFAULT_IMAGE_PATTERN: &str = "*.ino.bin";

/// Glob for the bootloader image used by `fwkit timestamps`.
pub const DEFAULT_BOOTLOADER_PATTERN: &str = "*.ino.bootloader.bin";

/// Main folders never considered by `fwkit dedupe`.
pub const DEFAULT_DEDUPE_SKIP: &[&str] = &["others"];

/// Board subfolder that build output is packed into by `fwkit relocate`.
pub const DEFAULT_RELOCATE_TARGET: &str = "esp32.esp32.esp32s3";

/// Prefix of build output directories handled by `fwkit relocate`.
pub const DEFAULT_BUILD_PREFIX: &str = "build";

/// Length of the random suffix appended to relocated build directories.
pub const RELOCATE_SUFFIX_LEN: usize = 6;

/// Group name for binaries that sit directly in the root.
pub const ROOT_GROUP: &str = "root";

/// Version handed to the first build without an explicit version.
pub const FALLBACK_VERSION_START: (u64, u64, u64) = (0, 0, 0);

/// Flash offset of merged images.
pub const MERGED_OFFSET: u64 = 0;

/// Flash offset of the second stage bootloader.
pub const BOOTLOADER_OFFSET: u64 = 0;

/// Flash offset of the partition table.
pub const PARTITIONS_OFFSET: u64 = 0x8000;

/// Flash offset of the application image.
pub const APPLICATION_OFFSET: u64 = 0x10000;

/// Environment variable naming the root directory.
pub const ROOT_ENV: &str = "FWKIT_ROOT";

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "FWKIT_CONFIG";

/// Default configuration file location.
pub static DEFAULT_CONFIG_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    dirs::config_dir()
        .map(|d| d.join("fwkit").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from(".fwkit.toml"))
});
