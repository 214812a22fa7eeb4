//! HTTP access to the search API.
//!
//! The paginator only needs one capability from the network: send a GET with
//! query parameters and get back a status code and a body. That capability is
//! the [`Transport`] trait, which keeps the paginator testable without a
//! server.
//!
//! - [`Transport`]: Core trait, one GET per call
//! - [`HttpTransport`]: `reqwest`-backed implementation bound to one endpoint URL
//!
//! Requests are never retried. A transport error ends the run.

use reqwest::Client;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::HarvestConfig;
use crate::error::Result;
use crate::models::Endpoint;

/// Status and body of one HTTP exchange, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Trait for issuing a single GET against the search endpoint.
///
/// Implementors report every status they receive as a [`RawResponse`]; only
/// failures that produce no status at all (connection refused, timeout)
/// are returned as errors.
pub trait Transport {
    /// Send one GET with `params` as the query string.
    async fn get(&self, params: &[(String, String)]) -> Result<RawResponse>;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: Url,
}

impl HttpTransport {
    /// Create a transport for `endpoint` using the base URL and timeout in `config`.
    ///
    /// # Arguments
    ///
    /// * `config` - Supplies the base URL and optional request timeout
    /// * `endpoint` - Which search endpoint every request goes to
    ///
    /// # Errors
    ///
    /// [`crate::error::HarvestError::Request`] if the client cannot be built,
    /// [`crate::error::HarvestError::InvalidUrl`] if the endpoint URL is invalid.
    pub fn new(config: &HarvestConfig, endpoint: Endpoint) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        let url = config.endpoint_url(endpoint)?;
        debug!(%url, "Created HTTP transport");
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Transport for HttpTransport {
    #[instrument(level = "debug", skip_all, fields(url = %self.url))]
    async fn get(&self, params: &[(String, String)]) -> Result<RawResponse> {
        let t0 = Instant::now();
        let res = self.client.get(self.url.clone()).query(params).send().await;
        let response = match res {
            Ok(response) => response,
            Err(e) => {
                warn!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %e, "GET failed");
                return Err(e.into());
            }
        };

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(
            status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "GET completed"
        );
        Ok(RawResponse { status, body })
    }
}
