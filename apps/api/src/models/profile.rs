use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::course::Level;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Education {
    #[serde(rename = "High School")]
    HighSchool,
    Bachelors,
    Masters,
    PhD,
}

impl fmt::Display for Education {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Education::HighSchool => "High School",
            Education::Bachelors => "Bachelors",
            Education::Masters => "Masters",
            Education::PhD => "PhD",
        };
        f.write_str(label)
    }
}

/// Echoed back to the caller; does not constrain ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PreferredDuration {
    #[default]
    #[serde(rename = "No preference")]
    NoPreference,
    #[serde(rename = "1–3 months", alias = "1-3 months")]
    OneToThreeMonths,
    #[serde(rename = "3–6 months", alias = "3-6 months")]
    ThreeToSixMonths,
    #[serde(rename = "6–12 months", alias = "6-12 months")]
    SixToTwelveMonths,
}

/// The profile submitted with one recommendation request. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub education: Education,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub technical_skills: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
    #[serde(default = "default_career_goal")]
    pub career_goal: String,
    #[serde(default)]
    pub preferred_duration: PreferredDuration,
    pub self_assessed_level: Level,
}

fn default_career_goal() -> String {
    "Data Scientist".to_string()
}

impl UserProfile {
    /// Renders the profile as the sentence that gets embedded.
    pub fn to_profile_text(&self) -> String {
        let major = match self.major.trim() {
            "" => "Not specified",
            m => m,
        };
        format!(
            "Education: {}. Major: {}. Technical skills: {}. Soft skills: {}. Career goal: {}.",
            self.education,
            major,
            join_or_none(&self.technical_skills),
            join_or_none(&self.soft_skills),
            self.career_goal.trim()
        )
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}
