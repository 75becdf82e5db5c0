//! Human-readable "why recommended" notes attached to each result.

use serde::Serialize;

use crate::models::course::CourseRecord;

/// Courses at or under this many weeks count as short-term (1–3 months).
const SHORT_TERM_MAX_WEEKS: u32 = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rationale {
    pub skill_gap: String,
    pub timeline: String,
    pub prerequisites: String,
}

impl Rationale {
    pub fn for_course(course: &CourseRecord, user_skills: &[String]) -> Self {
        Self {
            skill_gap: skill_gap_explanation(user_skills, &course.skill_tags),
            timeline: timeline_explanation(course.duration_weeks),
            prerequisites: prerequisite_note(&course.prerequisites),
        }
    }
}

/// Lists course skills the user does not already have (case-insensitive).
pub fn skill_gap_explanation(user_skills: &[String], course_skills: &[String]) -> String {
    let have: Vec<String> = user_skills.iter().map(|s| s.trim().to_lowercase()).collect();
    let missing: Vec<&str> = course_skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !have.iter().any(|h| h == &s.to_lowercase()))
        .collect();

    if missing.is_empty() {
        "You already have the core skills needed for this course.".to_string()
    } else {
        format!("You are missing these skills: {}", missing.join(", "))
    }
}

pub fn timeline_explanation(duration_weeks: u32) -> String {
    if duration_weeks <= SHORT_TERM_MAX_WEEKS {
        "This is a short-term course because it can be completed within 1–3 months, \
         and it builds foundational skills."
            .to_string()
    } else {
        "This is a long-term course because it requires more than 3 months to complete \
         and builds deeper or advanced expertise."
            .to_string()
    }
}

pub fn prerequisite_note(prerequisites: &[String]) -> String {
    if prerequisites.is_empty() {
        "No prerequisites required.".to_string()
    } else {
        format!("Prerequisites include: {}.", prerequisites.join(", "))
    }
}
