//! The single exit path of a harvest run.
//!
//! [`run`] lets the [`Paginator`] collect as much as it can, then persists
//! the aggregate exactly once, whether pagination finished, failed, or was
//! interrupted. The returned [`RunReport`] decides the process exit status.
//!
//! [`harvest_to_file`] adds the pre-flight steps for the CLI: refuse an
//! existing output file, then build the HTTP transport.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, instrument, warn};

use crate::api::{HttpTransport, Transport};
use crate::config::HarvestConfig;
use crate::error::{HarvestError, Result};
use crate::models::{AggregateResult, Query};
use crate::outputs::ResultSink;
use crate::outputs::json::JsonFileSink;
use crate::paginator::{FetchSummary, Paginator};
use crate::shutdown::Shutdown;

/// Outcome of one run.
#[derive(Debug)]
pub struct RunReport {
    /// How pagination ended.
    pub outcome: Result<FetchSummary>,
    /// Articles collected, equal to `total_articles` in the written file.
    pub articles: usize,
    /// Where the aggregate went, or why it could not be written.
    pub written: Result<PathBuf>,
}

impl RunReport {
    /// True only when every page arrived and the file was written.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok() && self.written.is_ok()
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(summary) => writeln!(
                f,
                "Fetched {} of {} pages ({} results reported).",
                summary.pages_fetched, summary.total_pages, summary.total_results
            )?,
            Err(HarvestError::Interrupted) => writeln!(f, "Interrupted; saving what was collected.")?,
            Err(e) => writeln!(f, "Stopped early: {e}")?,
        }
        writeln!(f, "Total number of articles obtained: {}", self.articles)?;
        match &self.written {
            Ok(path) => write!(f, "Data saved in {}", path.display()),
            Err(e) => write!(f, "No output could be written: {e}"),
        }
    }
}

/// Collect every page of `query` and persist the result once.
///
/// Never returns early: whatever pagination does, `sink.persist` is called
/// exactly once afterwards. A write failure on a run that already failed is
/// reported in the [`RunReport`] but does not replace the original error.
///
/// # Arguments
///
/// * `config` - Page size defaults for the paginator
/// * `transport` - Where page requests go
/// * `sink` - Receives the aggregate once, after pagination ends
/// * `query` - The search, also stored as metadata in the aggregate
/// * `shutdown` - Stop flag raced against each request
///
/// # Returns
///
/// A [`RunReport`] holding the pagination outcome and the write outcome.
#[instrument(level = "info", skip_all, fields(term = %query.term, endpoint = %query.endpoint))]
pub async fn run<T, S>(
    config: &HarvestConfig,
    transport: &T,
    sink: &S,
    query: Query,
    mut shutdown: Shutdown,
) -> RunReport
where
    T: Transport,
    S: ResultSink,
{
    let paginator = Paginator::new(transport, config);
    let mut aggregate = AggregateResult::new(query.clone());

    let outcome = paginator.collect(&query, &mut aggregate, &mut shutdown).await;
    match &outcome {
        Ok(summary) => info!(
            pages = summary.pages_fetched,
            articles = aggregate.len(),
            "Pagination complete"
        ),
        Err(HarvestError::Interrupted) => {
            warn!(articles = aggregate.len(), "Interrupted; saving partial results")
        }
        Err(e) => error!(error = %e, articles = aggregate.len(), "Stopping early; saving partial results"),
    }

    if aggregate.is_empty() {
        warn!("Nothing was collected; writing an empty result");
    }
    let written = sink.persist(&mut aggregate).await;
    if let Err(e) = &written {
        error!(error = %e, "No output could be written");
    }

    RunReport {
        outcome,
        articles: aggregate.len(),
        written,
    }
}

/// Run a harvest into a new JSON file at `output`.
///
/// # Arguments
///
/// * `config` - API base URL, key, timeout, and page size
/// * `query` - The search to run, with defaults already applied
/// * `output` - Destination path; must not exist
/// * `shutdown` - Stop flag, usually from [`crate::shutdown::listen_for_ctrl_c`]
///
/// # Errors
///
/// Fails before any request if `output` already exists
/// ([`HarvestError::DestinationExists`]) or the HTTP client cannot be built.
/// Everything after that is reported through the [`RunReport`].
pub async fn harvest_to_file(
    config: &HarvestConfig,
    query: Query,
    output: &Path,
    shutdown: Shutdown,
) -> Result<RunReport> {
    let sink = JsonFileSink::create(output)?;
    let transport = HttpTransport::new(config, query.endpoint)?;
    info!(url = %transport.url(), output = %sink.path().display(), "Starting harvest");
    Ok(run(config, &transport, &sink, query, shutdown).await)
}
