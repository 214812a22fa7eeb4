//! Command-line interface definitions for news_harvest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Connection settings can be provided via command-line flags or environment
//! variables. `main` loads `./.env` first, so the variables may live there.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, HarvestConfig};
use crate::error::Result;
use crate::models::{Endpoint, Query};
use crate::outputs::summary::DEFAULT_SHOW_LIMIT;

/// Command-line arguments for news_harvest.
///
/// # Examples
///
/// ```sh
/// # Fetch every page for a search term
/// news_harvest fetch "gender AND tech" gender_tech.json
///
/// # Build the query interactively
/// news_harvest custom my_query.json
///
/// # Print the first five articles of a saved file
/// news_harvest show gender_tech.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch all pages for a search term into a new JSON file
    Fetch(FetchArgs),
    /// Prompt for query parameters, then fetch into a new JSON file
    Custom(CustomArgs),
    /// Print the first articles of a saved JSON file
    Show(ShowArgs),
}

/// Connection settings shared by the commands that call the API.
#[derive(Args, Debug)]
pub struct ApiArgs {
    /// News API key (falls back to `API_KEY` when unset)
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the API
    #[arg(long, env = "NEWS_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Page size for queries that do not set one
    #[arg(
        long,
        env = "NEWS_PAGE_SIZE",
        default_value_t = DEFAULT_PAGE_SIZE,
        value_parser = clap::value_parser!(u32).range(1..=100)
    )]
    pub default_page_size: u32,

    /// Per-request timeout in seconds (no timeout when unset)
    #[arg(long, env = "NEWS_API_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

/// Older environment variable for the API key, still honoured.
pub const LEGACY_API_KEY_VAR: &str = "API_KEY";

/// Pick the API key: the flag or `NEWS_API_KEY` first, then the legacy variable.
fn resolve_api_key(explicit: Option<&str>, legacy: Option<String>) -> String {
    explicit
        .filter(|key| !key.trim().is_empty())
        .map(str::to_string)
        .or(legacy)
        .unwrap_or_default()
}

impl ApiArgs {
    /// Build the run configuration.
    pub fn to_config(&self) -> Result<HarvestConfig> {
        let api_key = resolve_api_key(
            self.api_key.as_deref(),
            std::env::var(LEGACY_API_KEY_VAR).ok(),
        );
        HarvestConfig::new(
            api_key,
            &self.base_url,
            self.default_page_size,
            self.timeout_secs.map(Duration::from_secs),
        )
    }
}

/// Search filters accepted by `fetch`.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Endpoint to search
    #[arg(long, value_enum, default_value_t = Endpoint::Everything)]
    pub endpoint: Endpoint,

    /// Article language, e.g. `en` (defaults to `en` for `everything`)
    #[arg(long)]
    pub language: Option<String>,

    /// Sort order: relevancy, popularity or publishedAt
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Results per page (1-100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub page_size: Option<u32>,

    /// Oldest article date, e.g. 2024-01-01
    #[arg(long)]
    pub from: Option<String>,

    /// Newest article date, e.g. 2024-01-31
    #[arg(long)]
    pub to: Option<String>,

    /// Comma-separated domains to restrict the search to
    #[arg(long)]
    pub domains: Option<String>,

    /// Comma-separated source ids
    #[arg(long)]
    pub sources: Option<String>,

    /// Fields to search: title, description, content
    #[arg(long)]
    pub search_in: Option<String>,

    /// Two-letter country code (top-headlines only)
    #[arg(long)]
    pub country: Option<String>,

    /// Category (top-headlines only)
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Search term, e.g. "gender AND tech"
    pub query: String,

    /// Output file; must not exist yet
    pub output: PathBuf,

    #[command(flatten)]
    pub filters: QueryArgs,

    #[command(flatten)]
    pub api: ApiArgs,
}

impl FetchArgs {
    /// The query described by the arguments, without credential or defaults.
    pub fn to_query(&self) -> Query {
        let f = &self.filters;
        Query {
            endpoint: f.endpoint,
            language: f.language.clone(),
            sort_by: f.sort_by.clone(),
            page_size: f.page_size,
            from: f.from.clone(),
            to: f.to.clone(),
            domains: f.domains.clone(),
            sources: f.sources.clone(),
            search_in: f.search_in.clone(),
            country: f.country.clone(),
            category: f.category.clone(),
            ..Query::new(self.query.clone(), "")
        }
    }
}

#[derive(Args, Debug)]
pub struct CustomArgs {
    /// Output file; must not exist yet
    pub output: PathBuf,

    #[command(flatten)]
    pub api: ApiArgs,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// A file written by `fetch` or `custom`
    pub input: PathBuf,

    /// How many articles to print
    #[arg(short, long, default_value_t = DEFAULT_SHOW_LIMIT)]
    pub limit: usize,
}
