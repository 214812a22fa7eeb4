//! Page-count policy and the sequential fetch loop.
//!
//! The paginator asks for page 1, learns `totalResults`, works out how many
//! pages exist, then walks pages `2..=total_pages` one at a time. Each page
//! is appended to the [`AggregateResult`] as soon as it arrives. The first
//! failure stops the loop: there is no retry and no page is skipped or
//! fetched twice.
//!
//! The paginator never writes the output file. It returns to
//! [`crate::harvest::run`], which owns the single persist.

use tracing::{error, info, instrument, warn};

use crate::api::Transport;
use crate::config::HarvestConfig;
use crate::error::{HarvestError, Result};
use crate::models::{AggregateResult, PageResponse, Query};
use crate::shutdown::Shutdown;
use crate::utils::truncate_for_log;

/// Result counts at or below this fit on a single page whatever the page
/// size; the provider will not serve more than this many results to a
/// developer account.
pub const PROVIDER_RESULT_CEILING: u64 = 100;

/// How many pages are needed for `total_results` at `page_size` per page.
///
/// Counts up to [`PROVIDER_RESULT_CEILING`] always take one page. Above it,
/// the result is `ceil(total_results / page_size)`. A `page_size` of zero is
/// treated as one.
///
/// # Arguments
///
/// * `total_results` - The `totalResults` hint from page 1
/// * `page_size` - Articles requested per page
///
/// # Returns
///
/// The number of pages to request, at least 1. Saturates at `u32::MAX`.
pub fn compute_total_pages(total_results: u64, page_size: u32) -> u32 {
    if total_results <= PROVIDER_RESULT_CEILING {
        return 1;
    }
    let page_size = u64::from(page_size.max(1));
    u32::try_from(total_results.div_ceil(page_size)).unwrap_or(u32::MAX)
}

/// What a completed pagination covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    pub total_results: u64,
    pub total_pages: u32,
    pub pages_fetched: u32,
}

/// Drives page requests through a [`Transport`].
#[derive(Debug)]
pub struct Paginator<'a, T> {
    transport: &'a T,
    config: &'a HarvestConfig,
}

impl<'a, T: Transport> Paginator<'a, T> {
    pub fn new(transport: &'a T, config: &'a HarvestConfig) -> Self {
        Self { transport, config }
    }

    /// Fetch a single page of `query`.
    ///
    /// # Arguments
    ///
    /// * `query` - The search parameters and credential
    /// * `page` - 1-based page number sent as `page`
    ///
    /// # Returns
    ///
    /// The decoded page, with its articles untouched.
    ///
    /// # Errors
    ///
    /// - [`HarvestError::Transport`] for any status other than 200, carrying
    ///   the status and raw body
    /// - [`HarvestError::MalformedResponse`] when the body has no `articles`
    /// - [`HarvestError::Request`] when no response arrived at all
    #[instrument(level = "info", skip_all, fields(page = page))]
    pub async fn fetch_page(&self, query: &Query, page: u32) -> Result<PageResponse> {
        info!(page, "Grabbing page");
        let params = query.params(page, self.config.page_size);
        let raw = self.transport.get(&params).await?;

        if !raw.is_ok() {
            error!(
                page,
                status = raw.status,
                body = %truncate_for_log(&raw.body, 500),
                "Request failed"
            );
            return Err(HarvestError::transport(raw.status, raw.body));
        }

        let response = PageResponse::from_body(&raw.body).inspect_err(|e| {
            warn!(page, error = %e, body = %truncate_for_log(&raw.body, 300), "Could not retrieve any articles");
        })?;
        info!(page, count = response.articles.len(), "Received page");
        Ok(response)
    }

    /// Fetch every page of `query` into `aggregate`.
    ///
    /// Articles are appended page by page, so when this returns an error
    /// `aggregate` holds exactly the pages that arrived before the failure.
    /// `shutdown` is checked before each request and raced against the
    /// request in flight.
    ///
    /// # Arguments
    ///
    /// * `query` - The fixed search; only the page number varies per request
    /// * `aggregate` - Receives each page's articles as soon as it arrives
    /// * `shutdown` - Cooperative stop flag
    ///
    /// # Returns
    ///
    /// A [`FetchSummary`] when every page arrived.
    ///
    /// # Errors
    ///
    /// The first failing page's error, or [`HarvestError::Interrupted`].
    /// Pages fetched before it stay in `aggregate`.
    #[instrument(level = "info", skip_all, fields(term = %query.term, endpoint = %query.endpoint))]
    pub async fn collect(
        &self,
        query: &Query,
        aggregate: &mut AggregateResult,
        shutdown: &mut Shutdown,
    ) -> Result<FetchSummary> {
        let mut page = 1;
        let first = self.fetch_or_stop(query, page, shutdown).await?;

        let total_results = first
            .total_results
            .ok_or_else(|| HarvestError::malformed("first page has no `totalResults` field"))?;
        let page_size = query.effective_page_size(self.config.page_size);
        let total_pages = compute_total_pages(total_results, page_size);
        aggregate.total_results = Some(total_results);
        aggregate.append(first.articles);
        info!(total_results, page_size, total_pages, "Total number of pages to paginate");

        while page < total_pages {
            page += 1;
            let next = self.fetch_or_stop(query, page, shutdown).await?;
            aggregate.append(next.articles);
        }

        Ok(FetchSummary {
            total_results,
            total_pages,
            pages_fetched: page,
        })
    }

    async fn fetch_or_stop(
        &self,
        query: &Query,
        page: u32,
        shutdown: &mut Shutdown,
    ) -> Result<PageResponse> {
        if shutdown.is_triggered() {
            warn!(page, "Shutdown requested; not fetching");
            return Err(HarvestError::Interrupted);
        }
        tokio::select! {
            biased;
            _ = shutdown.triggered() => {
                warn!(page, "Shutdown requested; abandoning request in flight");
                Err(HarvestError::Interrupted)
            }
            res = self.fetch_page(query, page) => res,
        }
    }
}
