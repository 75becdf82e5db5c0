use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Which embedding backend the service runs with.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingBackend {
    /// Deterministic feature hashing, no network.
    Hash,
    /// OpenAI-compatible `/embeddings` endpoint.
    Http,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_path: PathBuf,
    pub port: u16,
    pub rust_log: String,
    pub embedding_backend: EmbeddingBackend,
    pub embedding_dimension: usize,
    pub embedding_api_key: Option<String>,
    pub embedding_base_url: String,
    pub embedding_model: String,
    pub embedding_timeout: Duration,
    pub default_top_k: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let embedding_backend = match env_or("EMBEDDING_BACKEND", "hash").to_lowercase().as_str()
        {
            "hash" => EmbeddingBackend::Hash,
            "http" | "openai" => EmbeddingBackend::Http,
            other => bail!("EMBEDDING_BACKEND must be 'hash' or 'http', got '{other}'"),
        };

        let embedding_api_key = std::env::var("EMBEDDING_API_KEY").ok();
        if embedding_backend == EmbeddingBackend::Http && embedding_api_key.is_none() {
            bail!("EMBEDDING_API_KEY is required when EMBEDDING_BACKEND=http");
        }

        Ok(Config {
            catalog_path: PathBuf::from(env_or("CATALOG_PATH", "data/course_catalog.csv")),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            embedding_backend,
            embedding_dimension: env_or("EMBEDDING_DIMENSION", "384")
                .parse::<usize>()
                .context("EMBEDDING_DIMENSION must be a positive integer")?,
            embedding_api_key,
            embedding_base_url: env_or("EMBEDDING_BASE_URL", "https://api.openai.com/v1"),
            embedding_model: env_or("EMBEDDING_MODEL", "text-embedding-3-small"),
            embedding_timeout: Duration::from_secs(
                env_or("EMBEDDING_TIMEOUT_SECS", "30")
                    .parse::<u64>()
                    .context("EMBEDDING_TIMEOUT_SECS must be a number of seconds")?,
            ),
            default_top_k: env_or("DEFAULT_TOP_K", "10")
                .parse::<usize>()
                .context("DEFAULT_TOP_K must be a non-negative integer")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
