//! Extraction of review issues from a persisted execution log.
//!
//! The reviewer is instructed to end its answer with a fenced `json` block
//! holding an array of issues. Every failure along the way (unreadable file,
//! missing `result` entry, no block, malformed block) yields an empty list,
//! and individual malformed entries are dropped without affecting the rest.

use crate::types::ReviewIssue;
use claudecode_adapter::parse_optional;
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static JSON_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("static regex is valid")
});

/// Reads the execution log at `path` and returns the issues it reports.
pub async fn extract_issues(path: &Path) -> Vec<ReviewIssue> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(path = %path.display(), "Execution log unreadable: {e}");
            return Vec::new();
        }
    };

    let Some(entries) = parse_optional::<Vec<Value>>(&raw) else {
        return Vec::new();
    };

    find_result_text(&entries).map_or_else(Vec::new, issues_from_result_text)
}

/// Text of the first `{"type": "result", "result": "..."}` entry.
#[must_use]
pub fn find_result_text(entries: &[Value]) -> Option<&str> {
    entries
        .iter()
        .filter(|entry| entry.get("type").and_then(Value::as_str) == Some("result"))
        .find_map(|entry| entry.get("result").and_then(Value::as_str))
}

/// Parses the last fenced `json` block of `text` into validated issues.
#[must_use]
pub fn issues_from_result_text(text: &str) -> Vec<ReviewIssue> {
    let Some(block) = last_json_block(text) else {
        return Vec::new();
    };

    parse_optional::<Vec<Value>>(block)
        .unwrap_or_default()
        .into_iter()
        .filter(has_issue_shape)
        .filter_map(|entry| serde_json::from_value::<ReviewIssue>(entry).ok())
        .collect()
}

/// `file` must be absent or a string and `line` absent or a number; an
/// explicit `null` counts as present.
fn has_issue_shape(entry: &Value) -> bool {
    let Some(obj) = entry.as_object() else {
        return false;
    };
    obj.get("file").is_none_or(Value::is_string) && obj.get("line").is_none_or(Value::is_number)
}

/// Content of the last ```` ```json ```` fence; earlier blocks are drafts.
#[must_use]
pub fn last_json_block(text: &str) -> Option<&str> {
    JSON_BLOCK
        .captures_iter(text)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|block| !block.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use serde_json::json;
    use tempfile::TempDir;

    async fn extract_from(entries: &Value) -> Vec<ReviewIssue> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("claude-execution-output.json");
        std::fs::write(&path, entries.to_string()).unwrap();
        extract_issues(&path).await
    }

    fn result_log(text: &str) -> Value {
        json!([
            {"type": "system", "subtype": "init"},
            {"type": "assistant", "message": {"content": []}},
            {"type": "result", "result": text}
        ])
    }

    #[tokio::test]
    async fn missing_file_yields_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(extract_issues(&dir.path().join("missing.json")).await.is_empty());
    }

    #[tokio::test]
    async fn non_array_log_yields_nothing() {
        assert!(extract_from(&json!({"type": "result", "result": "x"})).await.is_empty());
    }

    #[tokio::test]
    async fn log_without_result_entry_yields_nothing() {
        let log = json!([{"type": "assistant", "result": "```json\n[]\n```"}]);
        assert!(extract_from(&log).await.is_empty());
    }

    #[tokio::test]
    async fn result_without_block_yields_nothing() {
        assert!(extract_from(&result_log("All good, no issues.")).await.is_empty());
    }

    #[tokio::test]
    async fn parses_issue_with_location() {
        let text = "## Summary\nLooks fine.\n\n```json\n[{\"severity\":\"CRITICAL\",\"file\":\"main.tf\",\"line\":12,\"description\":\"Hardcoded secret\"}]\n```";
        let issues = extract_from(&result_log(text)).await;
        assert_eq!(
            issues,
            vec![ReviewIssue {
                severity: Severity::Critical,
                file: Some("main.tf".into()),
                line: Some(12.into()),
                description: "Hardcoded secret".into(),
            }]
        );
    }

    #[test]
    fn last_block_wins() {
        let text = "Draft:\n```json\n[{\"severity\":\"WARNING\",\"description\":\"old\"}]\n```\nFinal:\n```json\n[{\"severity\":\"CRITICAL\",\"description\":\"new\"}]\n```";
        let issues = issues_from_result_text(text);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].description, "new");
    }

    #[test]
    fn invalid_entries_are_dropped_individually() {
        let text = r#"```json
[
  {"severity": "INVALID", "description": "bad severity"},
  {"severity": "WARNING", "description": "kept"},
  {"severity": "SUGGESTION"},
  {"severity": "SUGGESTION", "description": "bad line", "file": "a.yaml", "line": "7"},
  {"severity": "CRITICAL", "description": "bad file", "file": 3},
  "not an object"
]
```"#;
        let issues = issues_from_result_text(text);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].description, "kept");
    }

    #[test]
    fn any_numeric_line_is_kept_and_nulls_are_rejected() {
        let text = r#"```json
[
  {"severity": "WARNING", "file": "a.tf", "line": 12.0, "description": "float line"},
  {"severity": "WARNING", "file": "a.tf", "line": -1, "description": "negative line"},
  {"severity": "WARNING", "file": null, "description": "null file"},
  {"severity": "WARNING", "file": "a.tf", "line": null, "description": "null line"}
]
```"#;
        let issues = issues_from_result_text(text);
        let kept: Vec<&str> = issues.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(kept, ["float line", "negative line"]);
        assert_eq!(issues[0].anchor_line(), Some(12));
        assert_eq!(issues[1].anchor_line(), None);
    }

    #[test]
    fn non_array_block_and_empty_array_yield_nothing() {
        assert!(issues_from_result_text("```json\n{\"severity\":\"WARNING\"}\n```").is_empty());
        assert!(issues_from_result_text("```json\n[]\n```").is_empty());
        assert!(issues_from_result_text("```json\n[oops\n```").is_empty());
    }

    #[test]
    fn unlabeled_fences_are_ignored() {
        let text = "```\n[{\"severity\":\"WARNING\",\"description\":\"x\"}]\n```";
        assert!(last_json_block(text).is_none());
    }
}
