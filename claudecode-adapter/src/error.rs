use thiserror::Error;

/// Errors returned by the runner before any subprocess is spawned.
///
/// Lifecycle problems after spawn (stream errors, timeouts, signal failures)
/// never surface here; they are folded into [`crate::RunResult`].
#[derive(Debug, Error)]
pub enum ClaudeError {
    #[error("Claude executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Task input validation failed:\n{}", format_itemized(.0))]
    ValidationFailed(Vec<String>),

    #[error("Environment variable validation failed:\n{}", format_itemized(.0))]
    EnvValidationFailed(Vec<String>),

    #[error("Failed to prepare prompt pipe at stage '{stage}': {source}")]
    PipeSetup {
        stage: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Named pipes are not supported on this platform")]
    Unsupported,
}

/// Renders a list of messages as `  - message` lines.
#[must_use]
pub fn format_itemized(items: &[String]) -> String {
    items
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
