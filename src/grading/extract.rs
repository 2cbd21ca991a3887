//! Tolerant parsing of model replies into a [`GradeReport`].
//!
//! Models wrap their JSON in prose or code fences, drop fields and return
//! scores as strings. The first `{…}` span is pulled out by pattern, then
//! each category is read with a fallback.

use super::GradingError;
use crate::model::{CategoryScore, GradeCategory, GradeReport};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

pub const DEFAULT_SCORE: f64 = 50.0;
pub const DEFAULT_COMMENT: &str = "Not assessed";

static JSON_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{.*\}").expect("JSON object pattern is valid")
});

/// Returns the outermost brace-delimited span of `text`.
#[must_use]
pub fn find_json_object(text: &str) -> Option<&str> {
    JSON_OBJECT.find(text).map(|m| m.as_str())
}

/// Normalizes a model reply.
///
/// # Errors
///
/// [`GradingError::Parse`] when the reply holds no JSON object at all.
/// Anything short of that is filled with defaults.
pub fn parse_grade_response(provider: &str, text: &str) -> Result<GradeReport, GradingError> {
    let raw = find_json_object(text)
        .ok_or_else(|| GradingError::Parse("no JSON object in model reply".to_string()))?;

    let object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(GradingError::Parse("model reply is not an object".to_string())),
        Err(e) => return Err(GradingError::Parse(format!("malformed JSON in reply: {e}"))),
    };

    let categories = GradeCategory::ALL
        .iter()
        .map(|&category| read_category(&object, category))
        .collect();

    let summary = object
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    Ok(GradeReport::new(provider, categories, summary))
}

fn read_category(object: &Map<String, Value>, category: GradeCategory) -> CategoryScore {
    let entry = object.get(category.key());

    let (score, comment) = match entry {
        Some(Value::Object(fields)) => (
            fields.get("score").and_then(as_score),
            fields
                .get("comment")
                .and_then(Value::as_str)
                .map(str::to_string),
        ),
        Some(other) => (as_score(other), None),
        None => (None, None),
    };

    CategoryScore {
        category,
        score: score.map_or(DEFAULT_SCORE, |s| s.clamp(0.0, 100.0)),
        comment: comment
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COMMENT.to_string()),
    }
}

/// Accepts numbers and numeric strings such as `"85"` or `"85/100"`.
fn as_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .split('/')
            .next()
            .and_then(|head| head.trim().parse::<f64>().ok()),
        _ => None,
    }
    .filter(|s| s.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LetterGrade;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_json_from_fenced_prose() {
        let reply = r#"Here is my assessment:
```json
{
  "far_compliance": {"score": 92, "comment": "Close to optimum"},
  "space_efficiency": {"score": 88, "comment": "Compact cores"},
  "structural_design": {"score": 90, "comment": "Regular grid"},
  "cost_realism": {"score": 95, "comment": "On benchmark"},
  "regulatory_readiness": {"score": 90, "comment": "Setbacks shown"},
  "summary": "Solid proposal."
}
```
Let me know if you need more."#;

        let report = parse_grade_response("openai", reply).unwrap();
        assert_eq!(report.provider, "openai");
        assert_eq!(report.score_for(GradeCategory::SpaceEfficiency), Some(88.0));
        assert_eq!(report.categories[0].comment, "Close to optimum");
        assert_eq!(report.summary, "Solid proposal.");
        assert_eq!(report.grade, LetterGrade::A);
    }

    #[test]
    fn missing_fields_get_defaults() {
        let reply = r#"{"far_compliance": {"score": 70}, "cost_realism": "80/100"}"#;
        let report = parse_grade_response("gemini", reply).unwrap();

        assert_eq!(report.score_for(GradeCategory::FarCompliance), Some(70.0));
        assert_eq!(report.score_for(GradeCategory::CostRealism), Some(80.0));
        assert_eq!(
            report.score_for(GradeCategory::StructuralDesign),
            Some(DEFAULT_SCORE)
        );
        assert_eq!(report.categories[0].comment, DEFAULT_COMMENT);
        assert_eq!(report.summary, "");
    }

    #[test]
    fn scores_are_clamped() {
        let reply = r#"{"far_compliance": {"score": 140}, "space_efficiency": {"score": -5}}"#;
        let report = parse_grade_response("anthropic", reply).unwrap();
        assert_eq!(report.score_for(GradeCategory::FarCompliance), Some(100.0));
        assert_eq!(report.score_for(GradeCategory::SpaceEfficiency), Some(0.0));
    }

    #[test]
    fn reply_without_json_is_an_error() {
        let err = parse_grade_response("openai", "I cannot read this file.").unwrap_err();
        assert!(matches!(err, GradingError::Parse(_)));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_grade_response("openai", "{\"far_compliance\": }").unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }
}
