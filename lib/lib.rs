//! `fwkit` library.
//!
//! Maintenance tasks for a directory of ESP32 firmware builds: release
//! manifest generation, duplicate detection, build-time correlation and
//! build output relocation.

mod macros;

pub mod commands;
pub mod config;
pub mod constants;
pub mod dedupe;
pub mod error;
pub mod format;
pub mod handlers;
pub mod manifest;
pub mod prompt;
pub mod relocate;
pub mod scan;
pub mod styles;
pub mod timestamps;

//--------------------------------------------------------------------------------------------------
// Re-Exports
//--------------------------------------------------------------------------------------------------

pub use commands::*;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use manifest::{Build, Manifest, Part, PartType, build_manifest, write_manifest};
