//! Axum route handlers for the Recommendation API.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::course::{CourseRecord, Level, ScoredCourse};
use crate::models::profile::{PreferredDuration, UserProfile};
use crate::recommend::export::export_json;
use crate::recommend::rationale::Rationale;
use crate::state::AppState;

/// Upper bound on `top_k` accepted from callers.
const MAX_TOP_K: usize = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub profile: UserProfile,
    pub top_k: Option<usize>,
}

/// A scored course plus its explanation.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub scored: ScoredCourse,
    pub rationale: Rationale,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Informational only; not applied as a filter.
    pub preferred_duration: PreferredDuration,
    pub total_candidates: usize,
    pub results: Vec<Recommendation>,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub total: usize,
    pub courses: Vec<CourseRecord>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/recommendations
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    let preferred_duration = request.profile.preferred_duration;
    let (request_id, results) = run_recommendation(&state, request).await?;

    Ok(Json(RecommendResponse {
        request_id,
        generated_at: Utc::now(),
        preferred_duration,
        total_candidates: state.engine.catalog().len(),
        results,
    }))
}

/// POST /api/v1/recommendations/export
///
/// Same input as `handle_recommend`; returns the results as a downloadable
/// `recommendations.json`.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (_, results) = run_recommendation(&state, request).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"recommendations.json\"",
            ),
        ],
        export_json(&results),
    ))
}

/// GET /api/v1/catalog
pub async fn handle_list_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    let courses: Vec<CourseRecord> = state
        .engine
        .catalog()
        .all()
        .iter()
        .map(|e| e.record.clone())
        .collect();

    Json(CatalogResponse {
        total: courses.len(),
        courses,
    })
}

/// GET /api/v1/catalog/:id
pub async fn handle_get_course(
    State(state): State<AppState>,
    Path(id): Path<usize>,
) -> Result<Json<CourseRecord>, AppError> {
    state
        .engine
        .catalog()
        .get(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Course {id} not found")))
}

/// Validates the request, builds the profile text, ranks, and attaches rationales.
async fn run_recommendation(
    state: &AppState,
    request: RecommendRequest,
) -> Result<(Uuid, Vec<Recommendation>), AppError> {
    let top_k = request.top_k.unwrap_or(state.config.default_top_k);
    if top_k > MAX_TOP_K {
        return Err(AppError::Validation(format!(
            "top_k must be at most {MAX_TOP_K}"
        )));
    }

    let profile = request.profile;
    if profile.self_assessed_level == Level::Unspecified {
        return Err(AppError::Validation(
            "self_assessed_level must be Beginner, Intermediate or Advanced".to_string(),
        ));
    }

    let request_id = Uuid::new_v4();
    let user_text = profile.to_profile_text();
    info!(
        %request_id,
        level = ?profile.self_assessed_level,
        skills = profile.technical_skills.len(),
        preferred_duration = ?profile.preferred_duration,
        "Recommendation request"
    );

    let ranked = state
        .engine
        .recommend(
            &user_text,
            &profile.technical_skills,
            profile.self_assessed_level,
            top_k,
        )
        .await?;

    let results = ranked
        .into_iter()
        .map(|scored| Recommendation {
            rationale: Rationale::for_course(&scored.course, &profile.technical_skills),
            scored,
        })
        .collect();

    Ok((request_id, results))
}
