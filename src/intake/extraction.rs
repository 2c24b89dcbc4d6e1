// src/intake/extraction.rs
// Parsing of extraction and summary payloads returned by the oracle

use crate::error::{IntakeError, Result};
use crate::intake::fields::CollectedFields;
use crate::utils::{json_object_span, strip_code_fence, truncate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Template names the oracle sometimes fills in when nothing was said
const PLACEHOLDER_NAMES: &[&str] = &["John Doe", "Jane Doe", "Jane Smith", "John Smith"];

const FALLBACK_SUMMARY: &str =
    "Case summary generation failed. Please review conversation transcript.";
const FALLBACK_ACTIONS: &str =
    "• Review conversation manually\n• Determine eligibility\n• Contact applicant";

fn is_placeholder_name(name: &str) -> bool {
    PLACEHOLDER_NAMES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(name.trim()))
}

/// Pull the JSON object out of an oracle reply that may carry a code fence or prose
fn parse_object(text: &str) -> Result<Value> {
    let unfenced = strip_code_fence(text);
    let span = json_object_span(unfenced).ok_or_else(|| {
        IntakeError::MalformedExtraction(format!("no JSON object in {:?}", truncate(text, 80)))
    })?;
    serde_json::from_str(span).map_err(|e| IntakeError::MalformedExtraction(e.to_string()))
}

/// Parse an extraction reply into a typed delta.
///
/// Placeholder names are dropped before the delta is built, so they can never
/// overwrite a real name collected earlier.
pub fn parse_extraction(text: &str) -> Result<CollectedFields> {
    let raw = parse_object(text)?;
    let mut delta = CollectedFields::from_extraction(&raw);

    if delta
        .personal
        .full_name
        .as_deref()
        .is_some_and(is_placeholder_name)
    {
        debug!("Discarded placeholder full name from extraction");
        delta.personal.full_name = None;
    }
    if let (Some(first), Some(last)) = (&delta.personal.first_name, &delta.personal.last_name)
        && is_placeholder_name(&format!("{} {}", first, last))
    {
        debug!("Discarded placeholder first/last name from extraction");
        delta.personal.first_name = None;
        delta.personal.last_name = None;
    }

    Ok(delta)
}

/// Narrative part of a case submission as drafted by the summary stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryDraft {
    pub summary: String,
    pub programs: Vec<String>,
    pub actions: String,
}

impl SummaryDraft {
    /// Static draft used when the summary stage fails
    pub fn fallback() -> Self {
        Self {
            summary: FALLBACK_SUMMARY.to_string(),
            programs: Vec::new(),
            actions: FALLBACK_ACTIONS.to_string(),
        }
    }
}

/// Parse a summary reply `{summary, programs, actions}`.
/// `actions` may arrive as a list; it is joined into bullet lines.
pub fn parse_summary(text: &str) -> Result<SummaryDraft> {
    let raw = parse_object(text)?;

    let summary = raw
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| IntakeError::MalformedExtraction("summary missing".into()))?
        .to_string();

    let programs = match raw.get("programs") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    };

    let actions = match raw.get("actions") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .filter_map(Value::as_str)
            .map(|a| format!("• {}", a.trim_start_matches('•').trim()))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => FALLBACK_ACTIONS.to_string(),
    };

    Ok(SummaryDraft {
        summary,
        programs,
        actions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fenced_extraction() {
        let text = "```json\n{\"personal\": {\"age\": \"41\"}, \"household\": {\"size\": \"I live alone\"}}\n```";
        let delta = parse_extraction(text).unwrap();
        assert_eq!(delta.personal.age, Some(41));
        assert_eq!(delta.household.size, Some(1));
    }

    #[test]
    fn test_parse_extraction_with_prose() {
        let text = "Here is the data you asked for:\n{\"financial\": {\"monthly_income\": \"I'm unemployed, no income\"}}\nLet me know!";
        let delta = parse_extraction(text).unwrap();
        assert_eq!(delta.financial.monthly_income, Some(0.0));
    }

    #[test]
    fn test_placeholder_names_discarded() {
        let text = r#"{"personal": {"full_name": "John Doe", "age": 30}}"#;
        let delta = parse_extraction(text).unwrap();
        assert_eq!(delta.personal.full_name, None);
        assert_eq!(delta.personal.age, Some(30));

        let text = r#"{"personal": {"first_name": "jane", "last_name": "smith"}}"#;
        let delta = parse_extraction(text).unwrap();
        assert_eq!(delta.personal.first_name, None);
        assert_eq!(delta.personal.last_name, None);
    }

    #[test]
    fn test_real_name_kept() {
        let text = r#"{"personal": {"full_name": "John Dorian"}}"#;
        let delta = parse_extraction(text).unwrap();
        assert_eq!(delta.personal.full_name.as_deref(), Some("John Dorian"));
    }

    #[test]
    fn test_malformed_extraction() {
        assert!(matches!(
            parse_extraction("I could not find any data."),
            Err(IntakeError::MalformedExtraction(_))
        ));
        assert!(matches!(
            parse_extraction("{\"personal\": {\"age\": }"),
            Err(IntakeError::MalformedExtraction(_))
        ));
    }

    #[test]
    fn test_parse_summary() {
        let text = "```json\n{\"summary\": \"Maria is a parent of two.\", \"programs\": [\"SNAP\", \"Medi-Cal\"], \"actions\": \"• Verify income\"}\n```";
        let draft = parse_summary(text).unwrap();
        assert_eq!(draft.summary, "Maria is a parent of two.");
        assert_eq!(draft.programs, vec!["SNAP", "Medi-Cal"]);
        assert_eq!(draft.actions, "• Verify income");
    }

    #[test]
    fn test_parse_summary_action_list() {
        let text = r#"{"summary": "s", "actions": ["Verify income", "• Call back"]}"#;
        let draft = parse_summary(text).unwrap();
        assert!(draft.programs.is_empty());
        assert_eq!(draft.actions, "• Verify income\n• Call back");
    }

    #[test]
    fn test_parse_summary_requires_narrative() {
        assert!(parse_summary(r#"{"programs": ["SNAP"]}"#).is_err());
    }

    #[test]
    fn test_fallback_summary() {
        let draft = SummaryDraft::fallback();
        assert!(draft.programs.is_empty());
        assert!(draft.summary.starts_with("Case summary generation failed"));
        assert_eq!(draft.actions.lines().count(), 3);
    }
}
