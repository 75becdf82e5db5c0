//! Penalty Evaluator: dampens courses the user is not ready for.
//!
//! Penalties are multiplicative and coarse. Only the Beginner × Advanced rule
//! zeroes a course out; everything else stays visible, just lower.
//!
//! Rules, first match wins:
//! 1. Beginner user, Advanced course → 0.0, prep required
//! 2. No prerequisites (the raw cell was a marker, or held no tokens) → 1.0
//! 3. Any prerequisite token not found as a substring of the user's joined
//!    technical skills → 0.6, prep required
//! 4. Otherwise → 1.0
//!
//! Rule 3 is a substring test: "machine learning" in the skills satisfies
//! "learning", and "nosql" satisfies "sql".

use crate::models::course::{CourseRecord, Level};

/// Cell values that mean "this course has no prerequisites".
pub const NO_PREREQUISITE_MARKERS: [&str; 4] = ["none", "nan", "", "null"];

const BLOCKED_MULTIPLIER: f64 = 0.0;
const MISSING_PREREQ_MULTIPLIER: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penalty {
    pub multiplier: f64,
    pub prep_required: bool,
}

impl Penalty {
    pub const NONE: Penalty = Penalty {
        multiplier: 1.0,
        prep_required: false,
    };
    pub const BLOCKED: Penalty = Penalty {
        multiplier: BLOCKED_MULTIPLIER,
        prep_required: true,
    };
    pub const MISSING_PREREQUISITES: Penalty = Penalty {
        multiplier: MISSING_PREREQ_MULTIPLIER,
        prep_required: true,
    };
}

/// True when a raw prerequisites cell is one of the "no prerequisites" markers.
pub fn is_no_prerequisite_marker(raw: &str) -> bool {
    NO_PREREQUISITE_MARKERS.contains(&raw.trim().to_lowercase().as_str())
}

/// Prerequisite tokens of a raw catalog cell.
///
/// The marker test runs on the whole cell: "nan," or "none, none" are not
/// markers and yield the tokens "nan" / "none", "none".
pub fn prerequisites_from_cell(raw: &str) -> Vec<String> {
    if is_no_prerequisite_marker(raw) {
        return Vec::new();
    }
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn evaluate(course: &CourseRecord, user_skills: &[String], user_level: Level) -> Penalty {
    if user_level == Level::Beginner && course.parsed_level() == Level::Advanced {
        return Penalty::BLOCKED;
    }

    if course.prerequisites.is_empty() {
        return Penalty::NONE;
    }

    let user_skill_text = user_skills.join(" ").to_lowercase();

    let missing = course
        .prerequisites
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .any(|p| !user_skill_text.contains(&p));

    if missing {
        Penalty::MISSING_PREREQUISITES
    } else {
        Penalty::NONE
    }
}
