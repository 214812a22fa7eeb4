//! Plain-text rendering of harvested articles.
//!
//! Used by the `show` command to print the first few articles of a saved
//! file: source, title, author, publication time, and URL.
//!
//! Articles are raw JSON. The helpers here only read from them and fall back
//! to a placeholder when a field is missing or has an unexpected type.

use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use std::fmt;

use crate::models::Article;

/// Number of articles `show` prints when no limit is given.
pub const DEFAULT_SHOW_LIMIT: usize = 5;

/// Display adapter listing the first `limit` of `articles`.
#[derive(Debug)]
pub struct ArticleListing<'a> {
    articles: &'a [Article],
    limit: usize,
}

impl<'a> ArticleListing<'a> {
    pub fn new(articles: &'a [Article], limit: usize) -> Self {
        Self { articles, limit }
    }
}

impl fmt::Display for ArticleListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self.limit.min(self.articles.len());
        writeln!(f, "Loaded {} articles", self.articles.len())?;
        if shown == 0 {
            return Ok(());
        }
        writeln!(f, "Displaying information on the first {shown} articles...")?;
        for article in self.articles.iter().take(shown) {
            writeln!(f)?;
            write_article(f, article)?;
        }
        Ok(())
    }
}

fn write_article(f: &mut fmt::Formatter<'_>, article: &Article) -> fmt::Result {
    let published = match published(article) {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S%:z").to_string(),
        None => text_field(article, "publishedAt").unwrap_or("unknown").to_string(),
    };
    writeln!(f, "Source: {}", source_name(article).unwrap_or("unknown"))?;
    writeln!(f, "Title: {}", text_field(article, "title").unwrap_or("(untitled)"))?;
    writeln!(f, "Written by: {}", text_field(article, "author").unwrap_or("unknown"))?;
    writeln!(f, "Published at: {published}")?;
    writeln!(f, "URL: {}", text_field(article, "url").unwrap_or("-"))
}

/// A string-valued top-level field of `article`.
fn text_field<'a>(article: &'a Value, key: &str) -> Option<&'a str> {
    article.get(key).and_then(Value::as_str)
}

/// The source's name: `source.name` when `source` is an object, or `source`
/// itself when it is a bare string.
fn source_name(article: &Value) -> Option<&str> {
    match article.get("source")? {
        Value::String(name) => Some(name.as_str()),
        source => source.get("name").and_then(Value::as_str),
    }
}

/// `publishedAt` parsed as RFC 3339.
fn published(article: &Value) -> Option<DateTime<FixedOffset>> {
    text_field(article, "publishedAt").and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
}
