//! Formatting utilities for human-readable output.

use chrono::{DateTime, Local, Utc};
use std::time::SystemTime;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Timestamp layout used in every report.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Hex digits shown for a shortened hash.
pub const SHORT_HASH_LEN: usize = 12;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Format a UTC time in the local timezone.
pub fn format_datetime(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
}

/// Format a filesystem time in the local timezone.
pub fn format_system_time(time: SystemTime) -> String {
    format_datetime(DateTime::<Utc>::from(time))
}

/// Flash offset as lowercase hex, e.g. `0x10000`.
pub fn format_offset(offset: u64) -> String {
    format!("{:#x}", offset)
}

/// Leading part of a hex digest.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..SHORT_HASH_LEN).unwrap_or(hash)
}

/// `1 build`, `2 builds`.
pub fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
