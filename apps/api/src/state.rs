use std::sync::Arc;

use crate::config::Config;
use crate::recommend::engine::RankingEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Immutable after startup; shared across requests without locking.
    pub engine: Arc<RankingEngine>,
    pub config: Config,
}
