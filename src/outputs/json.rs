//! JSON file output.
//!
//! The aggregate is written with a four-space indent so operators can read
//! it directly. [`JsonFileSink::load`] reads back only the `articles` array,
//! so any file with that key can be shown, including ones that carry
//! different metadata or none at all.

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{error, info, instrument};

use crate::error::{HarvestError, Result};
use crate::models::{AggregateResult, Article};
use crate::outputs::ResultSink;
use crate::utils::ensure_destination_available;

/// The part of a saved file that readers rely on.
///
/// Every other key (`query`, `datetime`, `total_articles`, ...) is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SavedArticles {
    pub articles: Vec<Article>,
}

/// Writes the aggregate to one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// Create a sink for `path`, refusing if the file already exists.
    ///
    /// This is the overwrite guard; it runs before any request is made.
    /// `persist` checks again when it opens the file.
    ///
    /// # Arguments
    ///
    /// * `path` - Destination of the JSON file
    ///
    /// # Returns
    ///
    /// A sink bound to `path`, or [`HarvestError::DestinationExists`].
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        ensure_destination_available(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the articles of a previously saved file.
    ///
    /// # Arguments
    ///
    /// * `path` - A JSON file with a top-level `articles` array
    ///
    /// # Returns
    ///
    /// The articles in file order. Other top-level keys are not required.
    ///
    /// # Errors
    ///
    /// [`HarvestError::Read`] if the file cannot be read, [`HarvestError::Json`]
    /// if it is not JSON or has no `articles` array.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<SavedArticles> {
        let path = path.as_ref();
        let bytes = fs::read(path).await.map_err(|source| HarvestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let saved: SavedArticles = serde_json::from_slice(&bytes)?;
        info!(articles = saved.articles.len(), "Loaded articles");
        Ok(saved)
    }
}

/// Serialize `aggregate` as JSON indented by four spaces, with a trailing newline.
pub fn to_pretty_json(aggregate: &AggregateResult) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    aggregate.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

impl ResultSink for JsonFileSink {
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    async fn persist(&self, aggregate: &mut AggregateResult) -> Result<PathBuf> {
        let total = aggregate.refresh_total();
        info!(total_articles = total, "Saving the data into a file");

        let json = to_pretty_json(aggregate)?;
        if let Err(e) = write_new(&self.path, &json).await {
            error!(error = %e, "Failed to write JSON");
            return Err(match e.kind() {
                ErrorKind::AlreadyExists => HarvestError::DestinationExists {
                    path: self.path.clone(),
                },
                _ => HarvestError::write(&self.path, e),
            });
        }

        info!(total_articles = total, "Wrote JSON file");
        Ok(self.path.clone())
    }
}

/// Write `bytes` to `path`, failing if the file appeared since the sink was created.
async fn write_new(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path).await?;
    file.write_all(bytes).await?;
    file.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Query;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> AggregateResult {
        let mut aggregate = AggregateResult::new(Query::new("gender AND tech", "secret-key"));
        aggregate.total_results = Some(3);
        aggregate.append(vec![
            json!({"source": {"id": null, "name": "Wired"}, "title": "First"}),
            json!({"title": "Second"}),
        ]);
        aggregate.append(vec![json!({"title": "Third", "extra": [1, 2]})]);
        aggregate
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "{}").unwrap();

        let err = JsonFileSink::create(&path).unwrap_err();
        assert!(matches!(err, HarvestError::DestinationExists { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_persist_then_load_keeps_order_and_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let sink = JsonFileSink::create(&path).unwrap();
        let mut aggregate = sample();

        let written = sink.persist(&mut aggregate).await.unwrap();
        assert_eq!(written, path);
        assert_eq!(aggregate.total_articles, 3);

        let loaded = JsonFileSink::load(&path).await.unwrap();
        assert_eq!(loaded.articles.len(), aggregate.total_articles);
        assert_eq!(loaded.articles, aggregate.articles);

        let text = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(raw["query"]["q"], json!("gender AND tech"));
        assert_eq!(raw["total_results"], json!(3));
    }

    #[tokio::test]
    async fn test_load_needs_only_articles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bare.json");
        std::fs::write(
            &path,
            r#"{"query_term": "old", "articles": [{"title": "a"}, {"title": 7}]}"#,
        )
        .unwrap();

        let loaded = JsonFileSink::load(&path).await.unwrap();
        assert_eq!(loaded.articles, vec![json!({"title": "a"}), json!({"title": 7})]);

        std::fs::write(&path, r#"{"status": "ok"}"#).unwrap();
        let err = JsonFileSink::load(&path).await.unwrap_err();
        assert!(matches!(err, HarvestError::Json(_)));
    }

    #[tokio::test]
    async fn test_persist_never_clobbers_file_created_mid_run() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let sink = JsonFileSink::create(&path).unwrap();
        std::fs::write(&path, "someone else's data").unwrap();

        let mut aggregate = sample();
        let err = sink.persist(&mut aggregate).await.unwrap_err();
        assert!(matches!(err, HarvestError::DestinationExists { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "someone else's data");
    }

    #[tokio::test]
    async fn test_persisted_file_is_pretty_and_keyless() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let sink = JsonFileSink::create(&path).unwrap();
        let mut aggregate = sample();
        sink.persist(&mut aggregate).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n    \"total_articles\": 3"));
        assert!(text.contains("\"articles\": ["));
        assert!(!text.contains("secret-key"));
        assert!(text.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_persist_reports_write_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("out.json");
        let sink = JsonFileSink::create(&path).unwrap();
        let mut aggregate = sample();

        let err = sink.persist(&mut aggregate).await.unwrap_err();
        assert!(matches!(err, HarvestError::Write { .. }));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = JsonFileSink::load(dir.path().join("nope.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, HarvestError::Read { .. }));
    }
}
