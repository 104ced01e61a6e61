//! Response Parser
//!
//! Model output is free-form text even when JSON was requested. Parsing is
//! strict first and falls back to [`recover_meaning`] and line splitting, so
//! it never fails.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::task::Task;

/// Recovered notes are cut to this many characters
pub const MAX_NOTES_CHARS: usize = 280;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)```").expect("valid regex"));

static MATCH_FLAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bmatch(?:es)?\b"?\s*[:=]\s*"?(true|false|yes|no)\b"#).expect("valid regex")
});

static RISK_LEVEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\brisk\b"?\s*[:=]?\s*"?(low|medium|high)\b"#).expect("valid regex")
});

static RISK_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(low|medium|high)[\s-]+risk\b").expect("valid regex"));

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*•·–]+|\d+[.)]|\(\d+\))\s*").expect("valid regex")
});

/// Meaning-drift risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Risk {
    Low,
    #[default]
    Medium,
    High,
}

impl FromStr for Risk {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Risk::Low),
            "medium" => Ok(Risk::Medium),
            "high" => Ok(Risk::High),
            _ => Err(()),
        }
    }
}

/// Meaning-preservation verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeaningCheck {
    #[serde(rename = "match")]
    pub matches: bool,
    pub risk: Risk,
    pub notes: String,
}

/// Summary bullets plus meaning verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub summary: Vec<String>,
    pub meaning: MeaningCheck,
}

/// Task result as returned in `{"result": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParsedResult {
    Text(String),
    Meaning(MeaningCheck),
    Bundle(Bundle),
}

/// Parse raw model output for `task`
pub fn parse(task: Task, raw: &str) -> ParsedResult {
    match task {
        Task::Simplify | Task::Summary => ParsedResult::Text(raw.to_string()),
        Task::Verify => ParsedResult::Meaning(parse_meaning(raw)),
        Task::Bundle => ParsedResult::Bundle(parse_bundle(raw)),
    }
}

/// Best-effort verdict from unstructured text
///
/// `match` defaults to false, `risk` to medium; `notes` is the leading
/// [`MAX_NOTES_CHARS`] characters of the text.
pub fn recover_meaning(raw: &str) -> MeaningCheck {
    let matches = MATCH_FLAG
        .captures(raw)
        .map(|c| matches!(c[1].to_ascii_lowercase().as_str(), "true" | "yes"))
        .unwrap_or(false);

    let risk = RISK_LEVEL
        .captures(raw)
        .or_else(|| RISK_PHRASE.captures(raw))
        .and_then(|c| c[1].parse().ok())
        .unwrap_or_default();

    MeaningCheck {
        matches,
        risk,
        notes: raw.trim().chars().take(MAX_NOTES_CHARS).collect(),
    }
}

/// Split a bullet list into items, stripping bullet and numbering markers
pub fn split_summary(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| LIST_MARKER.replace(line.trim(), "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

fn parse_meaning(raw: &str) -> MeaningCheck {
    extract_object(raw)
        .and_then(|v| meaning_from_value(&v))
        .unwrap_or_else(|| {
            tracing::debug!("Verdict is not valid JSON, recovering");
            recover_meaning(raw)
        })
}

fn parse_bundle(raw: &str) -> Bundle {
    let Some(value) = extract_object(raw) else {
        tracing::debug!("Bundle is not valid JSON, recovering from prose");
        return Bundle {
            summary: split_summary(raw),
            meaning: recover_meaning(raw),
        };
    };

    let summary = match value.get("summary") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_owned))
            .collect(),
        Some(Value::String(text)) => split_summary(text),
        _ => Vec::new(),
    };

    let meaning = value
        .get("meaning")
        .and_then(meaning_from_value)
        .unwrap_or_else(|| recover_meaning(raw));

    Bundle { summary, meaning }
}

/// Strip code fences and parse the outermost `{...}` as JSON
fn extract_object(raw: &str) -> Option<Value> {
    let body = CODE_FENCE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map_or(raw, |m| m.as_str());
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str::<Value>(&body[start..=end])
        .ok()
        .filter(Value::is_object)
}

/// Strict verdict: requires a boolean (or boolean string) `match`
fn meaning_from_value(value: &Value) -> Option<MeaningCheck> {
    let matches = match value.get("match")? {
        Value::Bool(b) => *b,
        Value::String(s) if s.eq_ignore_ascii_case("true") => true,
        Value::String(s) if s.eq_ignore_ascii_case("false") => false,
        _ => return None,
    };
    let risk = value
        .get("risk")
        .and_then(Value::as_str)
        .and_then(|r| r.parse().ok())
        .unwrap_or_default();
    let notes = value
        .get("notes")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(MeaningCheck { matches, risk, notes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_tasks_verbatim() {
        let raw = "  Simple text.\n";
        assert_eq!(parse(Task::Simplify, raw), ParsedResult::Text(raw.into()));
        assert_eq!(parse(Task::Summary, raw), ParsedResult::Text(raw.into()));
    }

    #[test]
    fn test_verify_strict_json() {
        let raw = r#"{"match": true, "risk": "low", "notes": "Same meaning."}"#;
        assert_eq!(
            parse(Task::Verify, raw),
            ParsedResult::Meaning(MeaningCheck {
                matches: true,
                risk: Risk::Low,
                notes: "Same meaning.".into()
            })
        );
    }

    #[test]
    fn test_verify_fenced_json() {
        let raw = "Here you go:\n```json\n{\"match\": false, \"risk\": \"HIGH\", \"notes\": \"Dropped a date.\"}\n```";
        let ParsedResult::Meaning(check) = parse(Task::Verify, raw) else {
            panic!("expected a verdict");
        };
        assert!(!check.matches);
        assert_eq!(check.risk, Risk::High);
        assert_eq!(check.notes, "Dropped a date.");
    }

    #[test]
    fn test_recover_meaning_from_prose() {
        let check = recover_meaning("Match: yes. Overall this is a low risk rewrite.");
        assert!(check.matches);
        assert_eq!(check.risk, Risk::Low);

        let check = recover_meaning("\"match\": false, \"risk\": \"high\"");
        assert!(!check.matches);
        assert_eq!(check.risk, Risk::High);
    }

    #[test]
    fn test_recover_meaning_defaults() {
        let long = "x".repeat(400);
        let check = recover_meaning(&long);
        assert!(!check.matches);
        assert_eq!(check.risk, Risk::Medium);
        assert_eq!(check.notes.chars().count(), MAX_NOTES_CHARS);
    }

    #[test]
    fn test_recover_meaning_truncates_on_char_boundary() {
        let check = recover_meaning(&"ü".repeat(300));
        assert_eq!(check.notes.chars().count(), MAX_NOTES_CHARS);
    }

    #[test]
    fn test_bundle_valid_json_verbatim() {
        let raw = json!({
            "summary": ["- One", "Two"],
            "meaning": { "match": true, "risk": "low", "notes": "ok" }
        })
        .to_string();
        let ParsedResult::Bundle(bundle) = parse(Task::Bundle, &raw) else {
            panic!("expected a bundle");
        };
        assert_eq!(bundle.summary, vec!["- One", "Two"]);
        assert!(bundle.meaning.matches);
        assert_eq!(bundle.meaning.risk, Risk::Low);
    }

    #[test]
    fn test_bundle_string_summary_and_missing_meaning() {
        let raw = r#"{"summary": "1. First point\n2) Second point\n\n• Third"}"#;
        let ParsedResult::Bundle(bundle) = parse(Task::Bundle, raw) else {
            panic!("expected a bundle");
        };
        assert_eq!(bundle.summary, vec!["First point", "Second point", "Third"]);
        assert!(!bundle.meaning.matches);
        assert_eq!(bundle.meaning.risk, Risk::Medium);
    }

    #[test]
    fn test_bundle_prose_fallback() {
        let raw = "- The city opens a new park.\n- It has a lake.\nThe meaning looks preserved.";
        let ParsedResult::Bundle(bundle) = parse(Task::Bundle, raw) else {
            panic!("expected a bundle");
        };
        assert_eq!(bundle.summary.len(), 3);
        assert_eq!(bundle.summary[0], "The city opens a new park.");
        assert_eq!(bundle.meaning.risk, Risk::Medium);
        assert!(!bundle.meaning.notes.is_empty());
    }

    #[test]
    fn test_result_serialization() {
        let json = serde_json::to_value(ParsedResult::Meaning(MeaningCheck {
            matches: true,
            risk: Risk::High,
            notes: "n".into(),
        }))
        .unwrap();
        assert_eq!(json, json!({ "match": true, "risk": "high", "notes": "n" }));

        let json = serde_json::to_value(ParsedResult::Text("plain".into())).unwrap();
        assert_eq!(json, json!("plain"));
    }
}
