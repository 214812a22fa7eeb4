//! Error types for a harvest run.
//!
//! Every failure in this crate is a [`HarvestError`]. None of them are
//! retried: the paginator stops at the first one and hands it to
//! [`crate::harvest::run`], which persists what was collected and turns the
//! error into a non-zero exit status.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for news_harvest.
#[derive(Error, Debug)]
pub enum HarvestError {
    // ------------------------------------------------------------------
    // Fetch errors (terminal for the run)
    // ------------------------------------------------------------------
    /// The API answered with something other than `200 OK`.
    #[error("request failed with status {status}: {body}")]
    Transport { status: u16, body: String },

    /// The API answered `200 OK` but the body lacks a field we need.
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    /// The request never produced a status (connect failure, timeout, ...).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The operator asked us to stop.
    #[error("interrupted by operator")]
    Interrupted,

    // ------------------------------------------------------------------
    // Storage errors
    // ------------------------------------------------------------------
    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to overwrite existing file {}", path.display())]
    DestinationExists { path: PathBuf },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ------------------------------------------------------------------
    // Setup errors
    // ------------------------------------------------------------------
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("could not read answer from terminal: {0}")]
    Prompt(#[source] std::io::Error),
}

impl HarvestError {
    /// Create a transport error from a non-success response.
    pub fn transport(status: u16, body: impl Into<String>) -> Self {
        Self::Transport {
            status,
            body: body.into(),
        }
    }

    /// Create a malformed-response error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a write error for `path`.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for news_harvest.
pub type Result<T> = std::result::Result<T, HarvestError>;
