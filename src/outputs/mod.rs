//! Where harvested articles end up.
//!
//! # Submodules
//!
//! - [`json`]: Writes an [`AggregateResult`] to a pretty-printed JSON file and reads it back
//! - [`summary`]: Renders the first articles of a saved result as plain text
//!
//! # Output Structure
//!
//! ```text
//! {
//!     "query": { "q": "gender AND tech", "endpoint": "everything", ... },
//!     "datetime": "2025-05-06 20:30:00.123456",
//!     "total_results": 250,
//!     "total_articles": 250,
//!     "articles": [ ... ]
//! }
//! ```

use std::path::PathBuf;

use crate::error::Result;
use crate::models::AggregateResult;

pub mod json;
pub mod summary;

/// Destination for the aggregated result of a run.
///
/// [`crate::harvest::run`] calls [`ResultSink::persist`] exactly once per run.
pub trait ResultSink {
    /// Recompute `total_articles` and write the whole result.
    ///
    /// Returns the location written. A failure here is final; it is not retried.
    async fn persist(&self, aggregate: &mut AggregateResult) -> Result<PathBuf>;
}
