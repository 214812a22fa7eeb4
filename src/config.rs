//! Run configuration.
//!
//! [`HarvestConfig`] is built once in `main` from CLI flags and environment
//! variables and then passed by reference. Nothing below `main` reads the
//! environment.

use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{HarvestError, Result};
use crate::models::{Endpoint, Query};

/// Base URL of the News API v2 endpoints.
pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/";

/// Page size used when a query does not set one. The provider caps pages at 100.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Largest page size the provider accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Settings shared by every request in a run.
#[derive(Clone)]
pub struct HarvestConfig {
    /// Credential injected into every request as `apiKey`.
    pub api_key: String,
    /// Base URL; the endpoint path is joined onto it.
    pub base_url: Url,
    /// Page size for queries that leave it unset.
    pub page_size: u32,
    /// Language applied to `everything` queries that leave it unset.
    pub default_language: Option<String>,
    /// Sort order applied to `everything` queries that leave it unset.
    pub default_sort_by: Option<String>,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl HarvestConfig {
    /// Build a config and check it.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Config`] when the API key is blank or the page
    /// size is outside `1..=100`, and [`HarvestError::InvalidUrl`] when the
    /// base URL does not parse.
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        page_size: u32,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(HarvestError::config(
                "API key is not set (use --api-key or NEWS_API_KEY)",
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(HarvestError::config(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }

        // Url::join drops the last segment unless the base ends with '/'.
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };

        let config = Self {
            api_key,
            base_url,
            page_size,
            default_language: Some("en".to_string()),
            default_sort_by: Some("publishedAt".to_string()),
            timeout,
        };
        debug!(base_url = %config.base_url, page_size, ?timeout, "Built harvest config");
        Ok(config)
    }

    /// Full URL for `endpoint`.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url> {
        Ok(self.base_url.join(endpoint.path())?)
    }

    /// Fill in the credential and any defaults the query left unset.
    ///
    /// Language and sort order only apply to the `everything` endpoint.
    pub fn apply_defaults(&self, mut query: Query) -> Query {
        query.api_key = self.api_key.clone();
        if query.endpoint == Endpoint::Everything {
            if query.language.is_none() {
                query.language = self.default_language.clone();
            }
            if query.sort_by.is_none() {
                query.sort_by = self.default_sort_by.clone();
            }
        }
        query
    }
}

impl std::fmt::Debug for HarvestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarvestConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("page_size", &self.page_size)
            .field("default_language", &self.default_language)
            .field("default_sort_by", &self.default_sort_by)
            .field("timeout", &self.timeout)
            .finish()
    }
}
