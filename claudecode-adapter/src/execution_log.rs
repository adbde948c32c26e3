//! Persistence of the captured JSON-lines stream as an execution log.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// File name of the execution log inside the run's temp directory.
pub const EXECUTION_LOG_FILE: &str = "claude-execution-output.json";

/// Parses `text` as `T`, treating any failure as absence.
///
/// Used wherever partially corrupt input is tolerated one element at a time.
pub fn parse_optional<T: DeserializeOwned>(text: &str) -> Option<T> {
    serde_json::from_str(text).ok()
}

/// Parses every non-blank line as one JSON value, dropping lines that fail.
#[must_use]
pub fn parse_log_lines(raw: &str) -> Vec<Value> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_optional::<Value>)
        .collect()
}

/// Writes the parsed entries of `raw` as a pretty-printed JSON array.
///
/// Returns `None` without touching the filesystem when `raw` is blank, and
/// also when the write fails (logged as a warning).
pub async fn save_execution_log(raw: &str, path: &Path) -> Option<PathBuf> {
    if raw.trim().is_empty() {
        return None;
    }

    let entries = parse_log_lines(raw);
    let body = match serde_json::to_string_pretty(&entries) {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Failed to serialize execution output: {e}");
            return None;
        }
    };

    match tokio::fs::write(path, body).await {
        Ok(()) => Some(path.to_path_buf()),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to save execution output: {e}");
            None
        }
    }
}
