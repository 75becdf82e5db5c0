//! Ranking Engine: scores the whole catalog against one profile.
//!
//! Algorithm:
//! 1. Embed the profile text once (bounded by the configured timeout)
//! 2. raw_similarity = cosine(profile, course) for every catalog entry
//! 3. adjusted_similarity = raw_similarity × penalty multiplier
//! 4. fit_score = min-max normalised raw_similarity over the whole candidate set
//! 5. Sort by adjusted desc, raw desc, catalog order (stable)
//! 6. Truncate to top_k

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::embedding::{embed_with_timeout, EmbeddingError, EmbeddingProvider};
use crate::models::course::{Level, ScoredCourse};
use crate::recommend::catalog::{CatalogEntry, CatalogStore};
use crate::recommend::penalty;
use crate::recommend::similarity::cosine_similarity;

/// Immutable scoring context: one catalog, one provider.
///
/// Constructed explicitly and shared as `Arc<RankingEngine>`; several
/// independent engines (e.g. over fixture catalogs) can coexist.
pub struct RankingEngine {
    catalog: CatalogStore,
    provider: Arc<dyn EmbeddingProvider>,
    embed_timeout: Duration,
}

impl RankingEngine {
    pub fn new(
        catalog: CatalogStore,
        provider: Arc<dyn EmbeddingProvider>,
        embed_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            provider,
            embed_timeout,
        }
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Returns `min(top_k, catalog size)` courses, best first.
    ///
    /// Fails only if the profile text cannot be embedded; nothing is returned
    /// in that case.
    pub async fn recommend(
        &self,
        user_text: &str,
        user_skills: &[String],
        user_level: Level,
        top_k: usize,
    ) -> Result<Vec<ScoredCourse>, EmbeddingError> {
        let user_embedding =
            embed_with_timeout(self.provider.as_ref(), user_text, self.embed_timeout).await?;

        if let Some(expected) = self.catalog.dimension() {
            if user_embedding.len() != expected {
                return Err(EmbeddingError::DimensionMismatch {
                    expected,
                    actual: user_embedding.len(),
                });
            }
        }

        let ranked = rank(
            &user_embedding,
            self.catalog.all(),
            user_skills,
            user_level,
            top_k,
        );

        info!(
            candidates = self.catalog.len(),
            returned = ranked.len(),
            top_k,
            "Ranked catalog"
        );
        Ok(ranked)
    }
}

/// Synchronous core of `recommend`, given an already-computed profile embedding.
pub fn rank(
    user_embedding: &[f32],
    entries: &[CatalogEntry],
    user_skills: &[String],
    user_level: Level,
    top_k: usize,
) -> Vec<ScoredCourse> {
    let mut scored: Vec<ScoredCourse> = entries
        .iter()
        .map(|entry| {
            let raw_similarity = cosine_similarity(user_embedding, &entry.embedding);
            let penalty = penalty::evaluate(&entry.record, user_skills, user_level);
            let adjusted = raw_similarity * penalty.multiplier;
            ScoredCourse {
                course: entry.record.clone(),
                raw_similarity,
                // a blocked course with negative raw would otherwise carry -0.0
                adjusted_similarity: if adjusted == 0.0 { 0.0 } else { adjusted },
                prep_required: penalty.prep_required,
                fit_score: 0,
            }
        })
        .collect();

    let raw: Vec<f64> = scored.iter().map(|s| s.raw_similarity).collect();
    for (course, fit) in scored.iter_mut().zip(fit_scores(&raw)) {
        course.fit_score = fit;
    }

    // sort_by is stable: equal keys keep catalog order
    scored.sort_by(|a, b| {
        b.adjusted_similarity
            .total_cmp(&a.adjusted_similarity)
            .then_with(|| b.raw_similarity.total_cmp(&a.raw_similarity))
    });

    scored.truncate(top_k);
    scored
}

/// Min-max normalises raw similarities to integers in 0–100 (floored).
/// When every value is equal the result is all zeros.
pub fn fit_scores(raw: &[f64]) -> Vec<u8> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if raw.is_empty() || max == min {
        if raw.len() > 1 {
            debug!(candidates = raw.len(), "Degenerate similarity range; fit scores are 0");
        }
        return vec![0; raw.len()];
    }

    raw.iter()
        .map(|r| (100.0 * (r - min) / (max - min)).floor().clamp(0.0, 100.0) as u8)
        .collect()
}
