//! Data models for queries, API pages, articles, and the aggregated result.
//!
//! - [`Query`]: The search parameters for a run, plus the API credential
//! - [`PageResponse`]: One decoded page from the search API
//! - [`Article`]: A single article, passed through as received
//! - [`AggregateResult`]: Everything collected in a run; this is what gets written to disk
//!
//! Field names follow the API's camelCase JSON so pages deserialize directly
//! and persisted files keep the provider's shape.

use chrono::Local;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{HarvestError, Result};

/// Which search endpoint a query targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Endpoint {
    /// Full archive search (`/v2/everything`).
    #[default]
    Everything,
    /// Breaking headlines (`/v2/top-headlines`).
    TopHeadlines,
}

impl Endpoint {
    /// The path segment appended to the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Everything => "everything",
            Endpoint::TopHeadlines => "top-headlines",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Search parameters for one run.
///
/// A query is fixed once a run starts. The page number is not part of it:
/// the paginator supplies it per request through [`Query::params`].
///
/// The API key is never serialized and never shows up in `Debug` output, so
/// the query can be logged and written to the output file as metadata.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Free-text search term (`q`).
    #[serde(rename = "q")]
    pub term: String,
    #[serde(default)]
    pub endpoint: Endpoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// Explicit page size. When unset the configured default is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip)]
    pub api_key: String,
}

impl Query {
    /// Create a query for `term` against the `everything` endpoint.
    pub fn new(term: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// The page size this query asks for, falling back to `default_page_size`.
    pub fn effective_page_size(&self, default_page_size: u32) -> u32 {
        self.page_size.unwrap_or(default_page_size).max(1)
    }

    /// Build the request parameters for `page`.
    ///
    /// Unset optional filters are left out entirely rather than sent empty.
    pub fn params(&self, page: u32, default_page_size: u32) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(12);
        if !self.term.is_empty() {
            params.push(("q".to_string(), self.term.clone()));
        }
        let optional = [
            ("language", &self.language),
            ("sortBy", &self.sort_by),
            ("from", &self.from),
            ("to", &self.to),
            ("domains", &self.domains),
            ("sources", &self.sources),
            ("searchIn", &self.search_in),
            ("country", &self.country),
            ("category", &self.category),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                params.push((name.to_string(), value.clone()));
            }
        }
        params.push((
            "pageSize".to_string(),
            self.effective_page_size(default_page_size).to_string(),
        ));
        params.push(("page".to_string(), page.to_string()));
        params.push(("apiKey".to_string(), self.api_key.clone()));
        params
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("term", &self.term)
            .field("endpoint", &self.endpoint)
            .field("language", &self.language)
            .field("sort_by", &self.sort_by)
            .field("page_size", &self.page_size)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("domains", &self.domains)
            .field("sources", &self.sources)
            .field("search_in", &self.search_in)
            .field("country", &self.country)
            .field("category", &self.category)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// A single article record, exactly as the API sent it.
///
/// Articles are never validated or reshaped: whatever JSON value appears in
/// a page's `articles` array is appended and written back out unchanged.
/// Read-only views for display live in [`crate::outputs::summary`].
pub type Article = Value;

/// One successfully fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    /// Articles on this page, in the order the API returned them.
    pub articles: Vec<Article>,
    /// The API's `totalResults` hint. Only page 1's value is used.
    pub total_results: Option<u64>,
}

impl PageResponse {
    /// Decode a `200 OK` body.
    ///
    /// # Errors
    ///
    /// [`HarvestError::MalformedResponse`] if the body is not a JSON object
    /// or has no `articles` array.
    pub fn from_body(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| HarvestError::malformed(format!("body is not valid JSON: {e}")))?;
        let Value::Object(mut object) = value else {
            return Err(HarvestError::malformed("body is not a JSON object"));
        };

        let articles = match object.remove("articles") {
            Some(Value::Array(articles)) => articles,
            Some(_) => return Err(HarvestError::malformed("`articles` is not an array")),
            None => return Err(HarvestError::malformed("response has no `articles` field")),
        };
        let total_results = object.get("totalResults").and_then(Value::as_u64);

        Ok(Self {
            articles,
            total_results,
        })
    }
}

/// Everything collected during one run.
///
/// Articles are only ever appended, in page order then in-page order.
/// `total_articles` is a derived field; [`AggregateResult::refresh_total`]
/// recomputes it right before the result is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub query: Query,
    /// Local time the run started.
    pub datetime: String,
    /// The API's `totalResults` hint from page 1, if page 1 arrived.
    #[serde(default)]
    pub total_results: Option<u64>,
    pub total_articles: usize,
    pub articles: Vec<Article>,
}

impl AggregateResult {
    /// Start an empty result for `query`, stamped with the current local time.
    pub fn new(query: Query) -> Self {
        Self {
            query,
            datetime: Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            total_results: None,
            total_articles: 0,
            articles: Vec::new(),
        }
    }

    /// Append one page's articles, keeping their order.
    pub fn append(&mut self, articles: Vec<Article>) {
        self.articles.extend(articles);
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Set `total_articles` to the current article count and return it.
    pub fn refresh_total(&mut self) -> usize {
        self.total_articles = self.articles.len();
        self.total_articles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article(title: &str) -> Article {
        json!({ "title": title })
    }

    #[test]
    fn test_query_params_include_page_and_key() {
        let mut query = Query::new("gender AND tech", "secret");
        query.language = Some("en".to_string());
        query.sort_by = Some("publishedAt".to_string());

        let params = query.params(3, 100);
        assert!(params.contains(&("q".to_string(), "gender AND tech".to_string())));
        assert!(params.contains(&("language".to_string(), "en".to_string())));
        assert!(params.contains(&("sortBy".to_string(), "publishedAt".to_string())));
        assert!(params.contains(&("pageSize".to_string(), "100".to_string())));
        assert!(params.contains(&("page".to_string(), "3".to_string())));
        assert!(params.contains(&("apiKey".to_string(), "secret".to_string())));
        assert!(!params.iter().any(|(k, _)| k == "domains"));
    }

    #[test]
    fn test_query_explicit_page_size_wins() {
        let mut query = Query::new("rust", "k");
        assert_eq!(query.effective_page_size(100), 100);
        query.page_size = Some(20);
        assert_eq!(query.effective_page_size(100), 20);
        query.page_size = Some(0);
        assert_eq!(query.effective_page_size(100), 1);
    }

    #[test]
    fn test_query_never_leaks_api_key() {
        let query = Query::new("rust", "super-secret-key");
        let json = serde_json::to_string(&query).unwrap();
        assert!(!json.contains("super-secret-key"));
        assert!(!format!("{query:?}").contains("super-secret-key"));
        assert!(json.contains(r#""q":"rust""#));
        assert!(json.contains(r#""endpoint":"everything""#));
    }

    #[test]
    fn test_endpoint_path() {
        assert_eq!(Endpoint::Everything.path(), "everything");
        assert_eq!(Endpoint::TopHeadlines.path(), "top-headlines");
        assert_eq!(Endpoint::TopHeadlines.to_string(), "top-headlines");
    }

    #[test]
    fn test_page_response_from_body() {
        let body = json!({
            "status": "ok",
            "totalResults": 250,
            "articles": [
                {
                    "source": {"id": null, "name": "Wired"},
                    "author": "Jane Doe",
                    "title": "First",
                    "url": "https://example.com/1",
                    "publishedAt": "2024-03-01T12:30:00Z",
                    "sentiment": 0.4
                },
                {"title": "Second"}
            ]
        })
        .to_string();

        let page = PageResponse::from_body(&body).unwrap();
        assert_eq!(page.total_results, Some(250));
        assert_eq!(page.articles.len(), 2);
        assert_eq!(page.articles[0]["source"]["name"], json!("Wired"));
        assert_eq!(page.articles[0]["sentiment"], json!(0.4));
        assert_eq!(page.articles[1], json!({"title": "Second"}));
    }

    #[test]
    fn test_page_response_missing_articles_is_malformed() {
        let body = json!({"status": "ok", "totalResults": 3}).to_string();
        let err = PageResponse::from_body(&body).unwrap_err();
        assert!(matches!(err, HarvestError::MalformedResponse { .. }));

        let err = PageResponse::from_body("not json").unwrap_err();
        assert!(matches!(err, HarvestError::MalformedResponse { .. }));

        let err = PageResponse::from_body(r#"{"articles": {}}"#).unwrap_err();
        assert!(matches!(err, HarvestError::MalformedResponse { .. }));
    }

    #[test]
    fn test_page_response_keeps_articles_verbatim() {
        let articles = json!([
            {"title": 42, "source": "Reuters"},
            {"title": "t", "custom": 1},
            "not even an object",
            null
        ]);
        let body = json!({"totalResults": 4, "articles": articles.clone()}).to_string();

        let page = PageResponse::from_body(&body).unwrap();
        assert_eq!(Value::Array(page.articles.clone()), articles);

        let mut aggregate = AggregateResult::new(Query::new("q", "k"));
        aggregate.append(page.articles);
        let written = serde_json::to_value(&aggregate).unwrap();
        assert_eq!(written["articles"][1], json!({"title": "t", "custom": 1}));
        assert_eq!(written["articles"][0], json!({"title": 42, "source": "Reuters"}));
    }

    #[test]
    fn test_aggregate_append_keeps_order_and_duplicates() {
        let mut aggregate = AggregateResult::new(Query::new("q", "k"));
        aggregate.append(vec![article("a"), article("b")]);
        aggregate.append(vec![article("b"), article("c")]);

        let titles: Vec<_> = aggregate
            .articles
            .iter()
            .map(|a| a["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["a", "b", "b", "c"]);
        assert_eq!(aggregate.total_articles, 0);
        assert_eq!(aggregate.refresh_total(), 4);
        assert_eq!(aggregate.total_articles, 4);
    }
}
