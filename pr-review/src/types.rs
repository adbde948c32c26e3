//! Review findings and pull-request addressing.

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Severity of a finding. Anything outside this set is rejected on parse.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Must be fixed before merging.
    Critical,
    /// Should be fixed.
    Warning,
    /// Optional improvement.
    Suggestion,
}

impl Severity {
    /// Upper-case label as it appears in comments.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Warning => "WARNING",
            Self::Suggestion => "SUGGESTION",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding from the reviewer's terminal JSON block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewIssue {
    /// How serious the finding is.
    pub severity: Severity,
    /// Repository-relative path the finding refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Line in `file` as the reviewer wrote it. Any JSON number is accepted;
    /// only [`ReviewIssue::anchor_line`] values are used to place a thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<Number>,
    /// Human-readable explanation.
    pub description: String,
}

impl ReviewIssue {
    /// `file:line`, `file`, or `general` for log output.
    #[must_use]
    pub fn location(&self) -> String {
        match (&self.file, &self.line) {
            (Some(file), Some(line)) => format!("{file}:{line}"),
            (Some(file), None) => file.clone(),
            (None, _) => "general".to_string(),
        }
    }

    /// `line` as a 1-based anchor: a positive whole number that fits `u32`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn anchor_line(&self) -> Option<u32> {
        let line = self.line.as_ref()?;
        let whole = line.as_u64().or_else(|| {
            line.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= f64::from(u32::MAX))
                .map(|f| f as u64)
        })?;
        u32::try_from(whole).ok().filter(|n| *n > 0)
    }
}

/// Addressing and credentials for one pull request's thread API.
#[derive(Clone, PartialEq, Eq)]
pub struct PrConfig {
    /// Organization/collection base URL, e.g. `https://dev.azure.com/org/`.
    pub collection_uri: String,
    /// Team project name or id.
    pub project: String,
    /// Repository id.
    pub repo_id: String,
    /// Pull request id.
    pub pr_id: String,
    /// Token used as the basic-auth password.
    pub access_token: String,
}

impl std::fmt::Debug for PrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrConfig")
            .field("collection_uri", &self.collection_uri)
            .field("project", &self.project)
            .field("repo_id", &self.repo_id)
            .field("pr_id", &self.pr_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
