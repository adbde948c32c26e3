//! Location of the `claude` executable on a CI agent.

use crate::error::ClaudeError;
use std::path::{Path, PathBuf};

/// Environment variable that points the task at a specific CLI binary.
pub const CLAUDE_BIN_ENV_VAR: &str = "CLAUDE_TASK_CLAUDE_BIN";

/// Program name handed to the OS when nothing better is known.
pub const CLAUDE_PROGRAM: &str = "claude";

/// Finds the CLI: `explicit` if given, then [`CLAUDE_BIN_ENV_VAR`], then
/// `claude` on `PATH`.
///
/// An explicit path is authoritative and is not followed by other lookups.
/// A stale override variable is logged and skipped.
///
/// # Errors
///
/// Returns `ClaudeError::ExecutableNotFound` when the explicit path is
/// missing or nothing is found on `PATH`.
pub fn discover_claude(explicit: Option<&Path>) -> Result<PathBuf, ClaudeError> {
    if let Some(path) = explicit {
        return if path.exists() {
            Ok(path.to_path_buf())
        } else {
            Err(ClaudeError::ExecutableNotFound(format!(
                "Explicit path does not exist: {}",
                path.display()
            )))
        };
    }

    if let Some(path) = std::env::var_os(CLAUDE_BIN_ENV_VAR).map(PathBuf::from) {
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(
            path = %path.display(),
            "{CLAUDE_BIN_ENV_VAR} points to a missing file, falling back to PATH"
        );
    }

    which::which(CLAUDE_PROGRAM).map_err(|e| ClaudeError::ExecutableNotFound(e.to_string()))
}

/// [`discover_claude`] that never fails: an unresolved CLI becomes the bare
/// program name so the spawn reports the real error and the run settles as a
/// failure instead of aborting.
#[must_use]
pub fn resolve_claude(explicit: Option<&Path>) -> PathBuf {
    discover_claude(explicit).unwrap_or_else(|e| {
        tracing::warn!("{e}; relying on PATH lookup at spawn time");
        PathBuf::from(CLAUDE_PROGRAM)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("claude");
        std::fs::write(&bin, "").unwrap();

        assert_eq!(discover_claude(Some(&bin)).unwrap(), bin);

        let missing = dir.path().join("nope");
        assert!(matches!(
            discover_claude(Some(&missing)),
            Err(ClaudeError::ExecutableNotFound(msg)) if msg.contains("nope")
        ));
    }

    #[test]
    fn resolve_falls_back_to_program_name() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(resolve_claude(Some(&missing)), PathBuf::from(CLAUDE_PROGRAM));
    }

    #[test]
    fn resolve_keeps_an_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("claude");
        std::fs::write(&bin, "").unwrap();
        assert_eq!(resolve_claude(Some(&bin)), bin);
    }
}
