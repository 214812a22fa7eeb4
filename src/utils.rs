//! Small helpers for logging and filesystem checks.

use std::path::Path;
use tracing::{info, instrument};

use crate::error::{HarvestError, Result};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (backing off to a character
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Arguments
///
/// * `s` - The string to truncate
/// * `max` - Maximum number of bytes to keep
///
/// # Returns
///
/// The original string if short enough, otherwise the truncated form.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Make sure nothing exists at `path`, so a run never overwrites a file.
///
/// # Errors
///
/// [`HarvestError::DestinationExists`] if the path is already taken.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn ensure_destination_available(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(HarvestError::DestinationExists {
            path: path.to_path_buf(),
        });
    }
    info!("Output destination is free");
    Ok(())
}
