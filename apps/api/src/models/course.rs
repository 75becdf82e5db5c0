use serde::{Deserialize, Serialize};

/// Course difficulty / self-assessed proficiency.
///
/// Parsed case-insensitively; anything unrecognised is `Unspecified`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
    #[default]
    Unspecified,
}

impl Level {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "beginner" => Level::Beginner,
            "intermediate" => Level::Intermediate,
            "advanced" => Level::Advanced,
            _ => Level::Unspecified,
        }
    }
}

impl From<String> for Level {
    fn from(raw: String) -> Self {
        Level::parse(&raw)
    }
}

/// One row of the course catalog. Immutable once loaded.
///
/// The embedding is not a field: it lives beside the record in
/// `CatalogEntry`, so serializing a record can never leak it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// 0-based position in the catalog; the final ranking tie-break.
    pub id: usize,
    pub title: String,
    pub provider: String,
    /// Level text as written in the catalog.
    pub level: String,
    pub duration_weeks: u32,
    pub skill_tags: Vec<String>,
    /// Empty when the catalog says "none" / "nan" / "null" / nothing.
    pub prerequisites: Vec<String>,
    pub link: String,
}

impl CourseRecord {
    pub fn parsed_level(&self) -> Level {
        Level::parse(&self.level)
    }
}

/// A course scored against one profile. Created per request.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCourse {
    #[serde(flatten)]
    pub course: CourseRecord,
    #[serde(serialize_with = "crate::recommend::export::finite_or_string")]
    pub raw_similarity: f64,
    #[serde(serialize_with = "crate::recommend::export::finite_or_string")]
    pub adjusted_similarity: f64,
    pub prep_required: bool,
    /// 0–100, relative to the min/max raw similarity of this request only.
    pub fit_score: u8,
}
