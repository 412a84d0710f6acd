//! Release manifest generation.
//!
//! Binaries below the root are grouped by top-level folder. Each folder
//! becomes one build whose parts come from its optional descriptor file and
//! from the file names of its `.bin` images.

mod builder;
mod descriptor;
mod types;


//--------------------------------------------------------------------------------------------------
// Re-Exports
//--------------------------------------------------------------------------------------------------

pub use builder::*;
pub use descriptor::*;
pub use types::*;
