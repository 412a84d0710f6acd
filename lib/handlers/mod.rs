//! Command handlers.

mod common;
mod dedupe_cmd;
mod manifest_cmd;
mod relocate_cmd;
mod timestamps_cmd;

//--------------------------------------------------------------------------------------------------
// Re-Exports
//--------------------------------------------------------------------------------------------------

pub use common::{clean_path, resolve_root, root_candidate};
pub use dedupe_cmd::{DedupeOptions, dedupe_folders};
pub use manifest_cmd::{ManifestOptions, generate_manifest};
pub use relocate_cmd::{RelocateCommandOptions, relocate_builds};
pub use timestamps_cmd::report_timestamps;
