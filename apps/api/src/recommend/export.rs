//! JSON-safe export of recommendation results.
//!
//! Export never fails. Each item becomes a JSON value with any top-level
//! `embedding` key removed; non-finite floats are written as strings; an item
//! serde cannot handle at all is written as its `Debug` text.

use std::fmt::Debug;

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

/// `serialize_with` helper: finite floats as numbers, NaN/inf as strings.
pub fn finite_or_string<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_str(&value.to_string())
    }
}

pub fn clean_for_json<T: Serialize + Debug>(items: &[T]) -> Vec<Value> {
    items
        .iter()
        .map(|item| match serde_json::to_value(item) {
            Ok(Value::Object(mut map)) => {
                map.remove("embedding");
                Value::Object(map)
            }
            Ok(other) => other,
            Err(e) => {
                warn!("Export fell back to string form: {e}");
                Value::String(format!("{item:?}"))
            }
        })
        .collect()
}

/// Pretty-printed JSON array of the cleaned items.
pub fn export_json<T: Serialize + Debug>(items: &[T]) -> String {
    let cleaned = Value::Array(clean_for_json(items));
    serde_json::to_string_pretty(&cleaned).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::models::course::{CourseRecord, ScoredCourse};

    fn scored(raw: f64) -> ScoredCourse {
        ScoredCourse {
            course: CourseRecord {
                id: 3,
                title: "ML Foundations".to_string(),
                provider: "Coursera".to_string(),
                level: "Intermediate".to_string(),
                duration_weeks: 10,
                skill_tags: vec!["ml".to_string()],
                prerequisites: vec![],
                link: "https://example.com/ml".to_string(),
            },
            raw_similarity: raw,
            adjusted_similarity: raw * 0.6,
            prep_required: true,
            fit_score: 42,
        }
    }

    #[derive(Debug, Serialize)]
    struct WithEmbedding {
        title: String,
        embedding: Vec<f32>,
    }

    #[derive(Debug)]
    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _s: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not supported"))
        }
    }

    #[test]
    fn test_scored_course_exports_flat_record() {
        let out = clean_for_json(&[scored(0.5)]);
        let obj = out[0].as_object().unwrap();

        assert_eq!(obj["title"], "ML Foundations");
        assert_eq!(obj["duration_weeks"], 10);
        assert_eq!(obj["raw_similarity"], 0.5);
        assert_eq!(obj["fit_score"], 42);
        assert_eq!(obj["prep_required"], true);
        assert!(!obj.contains_key("embedding"));
        assert!(!obj.contains_key("course"));
    }

    #[test]
    fn test_embedding_key_is_stripped() {
        let item = WithEmbedding {
            title: "x".to_string(),
            embedding: vec![0.1, 0.2],
        };
        let out = clean_for_json(&[item]);
        assert_eq!(out[0], serde_json::json!({ "title": "x" }));
    }

    #[test]
    fn test_non_finite_floats_become_strings() {
        let out = clean_for_json(&[scored(f64::NAN)]);
        assert_eq!(out[0]["raw_similarity"], "NaN");
    }

    #[test]
    fn test_unserializable_falls_back_to_debug_string() {
        let out = clean_for_json(&[Unserializable]);
        assert_eq!(out[0], Value::String("Unserializable".to_string()));
    }

    #[test]
    fn test_export_json_is_valid_json() {
        let text = export_json(&[scored(0.9), scored(f64::INFINITY)]);
        let parsed: Vec<BTreeMap<String, Value>> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1]["raw_similarity"], "inf");
    }

    #[test]
    fn test_export_empty_list() {
        let empty: [ScoredCourse; 0] = [];
        assert_eq!(export_json(&empty), "[]");
    }
}
