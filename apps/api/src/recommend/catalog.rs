//! Catalog Store: course records plus their cached embeddings.
//!
//! Built once at startup. Loading parses the CSV, embeds every record's
//! searchable text in one batch, and never touches the provider again.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::embedding::{embed_batch_with_timeout, EmbeddingError, EmbeddingProvider};
use crate::models::course::CourseRecord;
use crate::recommend::penalty::prerequisites_from_cell;

/// Columns without which a catalog is rejected.
const REQUIRED_COLUMNS: [&str; 4] = ["skill_tags", "prerequisites", "level", "duration_weeks"];

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("Cannot open catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalog CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Catalog is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Row {row}: duration_weeks '{value}' is not a non-negative number")]
    InvalidDuration { row: usize, value: String },

    #[error("Failed to embed catalog: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// A course and the embedding of its searchable text.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub record: CourseRecord,
    pub embedding: Vec<f32>,
}

/// Read-only after construction; safe to share across requests.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    entries: Vec<CatalogEntry>,
}

impl CatalogStore {
    pub async fn load(
        path: &Path,
        provider: &dyn EmbeddingProvider,
        timeout: Duration,
    ) -> Result<Self, CatalogLoadError> {
        let file = std::fs::File::open(path).map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_reader(file, provider, timeout).await?;
        if store.is_empty() {
            warn!("Catalog {} has no courses", path.display());
        }
        info!(
            "Catalog loaded from {}: {} courses",
            path.display(),
            store.len()
        );
        Ok(store)
    }

    pub async fn from_reader<R: Read>(
        reader: R,
        provider: &dyn EmbeddingProvider,
        timeout: Duration,
    ) -> Result<Self, CatalogLoadError> {
        let (records, texts) = parse_records(reader)?;
        if records.is_empty() {
            return Ok(Self::default());
        }

        let embeddings = embed_batch_with_timeout(provider, &texts, timeout).await?;

        let expected = embeddings[0].len();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: bad.len(),
            }
            .into());
        }

        let entries = records
            .into_iter()
            .zip(embeddings)
            .map(|(record, embedding)| CatalogEntry { record, embedding })
            .collect();

        Ok(Self { entries })
    }

    /// Builds a store from already-embedded entries (fixture catalogs).
    #[cfg(test)]
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Entries in catalog order.
    pub fn all(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, id: usize) -> Option<&CourseRecord> {
        self.entries.get(id).map(|e| &e.record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension, or `None` for an empty catalog.
    pub fn dimension(&self) -> Option<usize> {
        self.entries.first().map(|e| e.embedding.len())
    }
}

/// Parsed records plus, per record, the text to embed.
fn parse_records<R: Read>(
    reader: R,
) -> Result<(Vec<CourseRecord>, Vec<String>), CatalogLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|&name| column(name).is_none())
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(CatalogLoadError::MissingColumns(missing));
    }

    let title = column("title");
    let provider = column("provider");
    let level = column("level");
    let duration = column("duration_weeks");
    let skill_tags = column("skill_tags");
    let prerequisites = column("prerequisites");
    let link = column("link");

    let mut records = Vec::new();
    let mut texts = Vec::new();
    for (id, row) in csv_reader.records().enumerate() {
        let row = row?;
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .unwrap_or_default()
                .trim()
                .to_string()
        };

        let raw_duration = cell(duration);
        let duration_weeks =
            parse_duration_weeks(&raw_duration).ok_or(CatalogLoadError::InvalidDuration {
                row: id + 1,
                value: raw_duration,
            })?;

        let raw_tags = cell(skill_tags);
        let raw_prerequisites = cell(prerequisites);
        texts.push(searchable_text(&raw_tags, &raw_prerequisites));

        records.push(CourseRecord {
            id,
            title: cell(title),
            provider: cell(provider),
            level: cell(level),
            duration_weeks,
            skill_tags: split_list(&raw_tags),
            prerequisites: prerequisites_from_cell(&raw_prerequisites),
            link: cell(link),
        });
    }

    Ok((records, texts))
}

/// Text fed to the embedding provider: the skill_tags cell, a space, then the
/// prerequisites cell, both as written (markers and repeats included).
fn searchable_text(raw_tags: &str, raw_prerequisites: &str) -> String {
    format!("{raw_tags} {raw_prerequisites}")
}

/// Whole weeks; fractional values truncate ("12.7" → 12), empty → 0.
fn parse_duration_weeks(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0);
    }
    let value: f64 = raw.parse().ok()?;
    if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) {
        return None;
    }
    Some(value.trunc() as u32)
}

/// Comma-delimited cell → trimmed, non-empty, first-occurrence-ordered items.
fn split_list(raw: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !items.iter().any(|existing| existing == item) {
            items.push(item.to_string());
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::Mutex;

    const CATALOG: &str = "\
title,provider,level,duration_weeks,skill_tags,prerequisites,link
Python for Everybody,Coursera,Beginner,8.0,\"python, programming\",none,https://example.com/py
Deep Learning Specialization,Coursera,Advanced,16,\"dl, tensorflow, ml\",\"python, ml\",https://example.com/dl
SQL Basics,Udemy,Beginner,,sql,,https://example.com/sql
";

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_load_parses_every_row_in_order() {
        let store = CatalogStore::from_reader(CATALOG.as_bytes(), &HashEmbedder::new(64), TIMEOUT)
            .await
            .unwrap();

        assert_eq!(store.len(), 3);
        let titles: Vec<&str> = store.all().iter().map(|e| e.record.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Python for Everybody", "Deep Learning Specialization", "SQL Basics"]
        );
        assert_eq!(store.dimension(), Some(64));
        assert!(store.all().iter().enumerate().all(|(i, e)| e.record.id == i));
    }

    #[tokio::test]
    async fn test_fields_are_normalised() {
        let store = CatalogStore::from_reader(CATALOG.as_bytes(), &HashEmbedder::new(16), TIMEOUT)
            .await
            .unwrap();

        let py = store.get(0).unwrap();
        assert_eq!(py.duration_weeks, 8);
        assert_eq!(py.skill_tags, vec!["python", "programming"]);
        assert!(py.prerequisites.is_empty());

        let dl = store.get(1).unwrap();
        assert_eq!(dl.prerequisites, vec!["python", "ml"]);

        let sql = store.get(2).unwrap();
        assert_eq!(sql.duration_weeks, 0);
        assert!(sql.prerequisites.is_empty());
    }

    /// Records every text it is asked to embed.
    #[derive(Default)]
    struct RecordingEmbedder(Mutex<Vec<String>>);

    #[async_trait]
    impl EmbeddingProvider for RecordingEmbedder {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(vec![1.0, 0.0])
        }
    }

    #[tokio::test]
    async fn test_embedded_text_is_the_raw_cells() {
        let csv = "level,duration_weeks,skill_tags,prerequisites\n\
                   Beginner,8,\"python, programming\",none\n\
                   Beginner,4,\"sql, sql\",\"python, python\"\n\
                   Beginner,4,excel,\n";
        let embedder = RecordingEmbedder::default();
        let store = CatalogStore::from_reader(csv.as_bytes(), &embedder, TIMEOUT)
            .await
            .unwrap();

        let texts = embedder.0.lock().unwrap().clone();
        assert_eq!(
            texts,
            vec!["python, programming none", "sql, sql python, python", "excel "]
        );
        // Parsed lists stay normalised.
        assert!(store.get(0).unwrap().prerequisites.is_empty());
        assert_eq!(store.get(1).unwrap().skill_tags, vec!["sql"]);
    }

    #[tokio::test]
    async fn test_embeddings_follow_catalog_order() {
        let embedder = HashEmbedder::new(32);
        let store = CatalogStore::from_reader(CATALOG.as_bytes(), &embedder, TIMEOUT)
            .await
            .unwrap();

        let expected = embedder.embed("python, programming none").await.unwrap();
        assert_eq!(store.all()[0].embedding, expected);
        let expected = embedder.embed("dl, tensorflow, ml python, ml").await.unwrap();
        assert_eq!(store.all()[1].embedding, expected);
    }

    #[tokio::test]
    async fn test_missing_required_columns_are_all_reported() {
        let csv = "title,provider,level\nIntro,edX,Beginner\n";
        let err = CatalogStore::from_reader(csv.as_bytes(), &HashEmbedder::new(8), TIMEOUT)
            .await
            .unwrap_err();

        match err {
            CatalogLoadError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["skill_tags", "prerequisites", "duration_weeks"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_optional_columns_default_to_empty() {
        let csv = "level,duration_weeks,skill_tags,prerequisites\nBeginner,4,excel,none\n";
        let store = CatalogStore::from_reader(csv.as_bytes(), &HashEmbedder::new(8), TIMEOUT)
            .await
            .unwrap();

        let record = store.get(0).unwrap();
        assert_eq!(record.title, "");
        assert_eq!(record.provider, "");
        assert_eq!(record.link, "");
    }

    #[tokio::test]
    async fn test_bad_duration_aborts_load() {
        let csv = "level,duration_weeks,skill_tags,prerequisites\n\
                   Beginner,4,excel,none\n\
                   Beginner,six,excel,none\n";
        let err = CatalogStore::from_reader(csv.as_bytes(), &HashEmbedder::new(8), TIMEOUT)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CatalogLoadError::InvalidDuration { row: 2, ref value } if value == "six"
        ));
    }

    #[tokio::test]
    async fn test_ragged_rows_are_csv_errors() {
        let csv = "level,duration_weeks,skill_tags,prerequisites\nBeginner,4\n";
        let err = CatalogStore::from_reader(csv.as_bytes(), &HashEmbedder::new(8), TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogLoadError::Csv(_)));
    }

    #[tokio::test]
    async fn test_header_only_catalog_is_empty() {
        let csv = "level,duration_weeks,skill_tags,prerequisites\n";
        let store = CatalogStore::from_reader(csv.as_bytes(), &HashEmbedder::new(8), TIMEOUT)
            .await
            .unwrap();
        assert!(store.is_empty());
        assert_eq!(store.dimension(), None);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();

        let store = CatalogStore::load(file.path(), &HashEmbedder::new(16), TIMEOUT)
            .await
            .unwrap();
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = CatalogStore::load(
            Path::new("/definitely/not/here.csv"),
            &HashEmbedder::new(8),
            TIMEOUT,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CatalogLoadError::Io { .. }));
    }

    #[test]
    fn test_parse_duration_weeks() {
        assert_eq!(parse_duration_weeks("8"), Some(8));
        assert_eq!(parse_duration_weeks("12.7"), Some(12));
        assert_eq!(parse_duration_weeks(" 4.0 "), Some(4));
        assert_eq!(parse_duration_weeks(""), Some(0));
        assert_eq!(parse_duration_weeks("-3"), None);
        assert_eq!(parse_duration_weeks("nan"), None);
        assert_eq!(parse_duration_weeks("six"), None);
        assert_eq!(parse_duration_weeks("1e20"), None);
        assert_eq!(parse_duration_weeks("4294967295"), Some(u32::MAX));
    }

    #[test]
    fn test_split_list_dedups_and_trims() {
        assert_eq!(
            split_list(" python, sql ,, python,ml "),
            vec!["python", "sql", "ml"]
        );
        assert!(split_list("").is_empty());
    }
}
