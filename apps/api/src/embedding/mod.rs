//! Embedding Provider: the single seam through which text becomes a vector.
//!
//! The ranking engine and the catalog store only ever see `dyn EmbeddingProvider`.
//! Every call goes through `embed_with_timeout` / `embed_batch_with_timeout`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{Config, EmbeddingBackend};

pub mod hashing;
pub mod http;

pub use hashing::HashEmbedder;
pub use http::HttpEmbedder;

/// Texts per provider batch call; each batch gets its own timeout.
pub const BATCH_SIZE: usize = 64;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Embedding call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Provider returned {returned} embeddings for {requested} inputs")]
    EmptyResponse { requested: usize, returned: usize },
}

/// Converts free-form text into a fixed-dimension vector.
///
/// Implementations must be deterministic enough that the same text embeds to the
/// same vector for the lifetime of a `RankingEngine`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short backend label ("hash", "http") surfaced by `/health`.
    fn name(&self) -> &'static str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embeds many texts, preserving input order. Default: one call per text.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Embeds a single text, failing with `EmbeddingError::Timeout` past `limit`.
pub async fn embed_with_timeout(
    provider: &dyn EmbeddingProvider,
    text: &str,
    limit: Duration,
) -> Result<Vec<f32>, EmbeddingError> {
    tokio::time::timeout(limit, provider.embed(text))
        .await
        .map_err(|_| EmbeddingError::Timeout(limit))?
}

/// Batch counterpart of `embed_with_timeout`. Texts go out in chunks of
/// `BATCH_SIZE` and `limit` bounds each chunk, so large catalogs are not
/// cut off by a single deadline.
pub async fn embed_batch_with_timeout(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
    limit: Duration,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut out = Vec::with_capacity(texts.len());
    for chunk in texts.chunks(BATCH_SIZE) {
        let vectors = tokio::time::timeout(limit, provider.embed_batch(chunk))
            .await
            .map_err(|_| EmbeddingError::Timeout(limit))??;

        if vectors.len() != chunk.len() {
            return Err(EmbeddingError::EmptyResponse {
                requested: chunk.len(),
                returned: vectors.len(),
            });
        }
        out.extend(vectors);
    }
    Ok(out)
}

/// Builds the provider selected by `EMBEDDING_BACKEND`.
pub fn from_config(config: &Config) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    match config.embedding_backend {
        EmbeddingBackend::Hash => Ok(Arc::new(HashEmbedder::new(config.embedding_dimension))),
        EmbeddingBackend::Http => {
            let api_key = config
                .embedding_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("EMBEDDING_API_KEY is not set"))?;
            Ok(Arc::new(HttpEmbedder::new(
                api_key,
                &config.embedding_base_url,
                config.embedding_model.clone(),
                config.embedding_timeout,
            )?))
        }
    }
}
