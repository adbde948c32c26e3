//! Shared data types for runner configuration and results.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Default wall-clock budget for one CLI invocation.
pub const DEFAULT_TIMEOUT_MINUTES: u64 = 10;

/// Exit code reported when the run is cancelled by the timeout.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Exit code reported when the CLI process could not be spawned or awaited.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 1;

/// User-facing options for a single CLI invocation.
///
/// Every field mirrors a raw task input, so numeric values stay textual until
/// [`crate::prepare_invocation`] validates them. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Tool names the CLI may use, passed through verbatim.
    pub allowed_tools: Option<String>,
    /// Tool names the CLI must not use, passed through verbatim.
    pub disallowed_tools: Option<String>,
    /// Maximum number of agent turns; must be a positive integer.
    pub max_turns: Option<String>,
    /// MCP configuration file path or inline JSON.
    pub mcp_config: Option<String>,
    /// Replacement system prompt.
    pub system_prompt: Option<String>,
    /// Text appended to the default system prompt.
    pub append_system_prompt: Option<String>,
    /// Newline-delimited `KEY: value` environment variables for the CLI.
    pub claude_env: Option<String>,
    /// Model used when the primary model is overloaded.
    pub fallback_model: Option<String>,
    /// Timeout in minutes; must be a positive integer. Defaults to 10.
    pub timeout_minutes: Option<String>,
}

/// Environment supplied by the hosting platform rather than by task inputs.
#[derive(Debug, Clone, Default)]
pub struct RuntimeContext {
    /// Path to the `claude` executable. `None` triggers discovery.
    pub claude_path: Option<PathBuf>,
    /// Directory holding the prompt pipe and the execution log.
    /// Defaults to the OS temp directory.
    pub tmp_dir: Option<PathBuf>,
    /// Working directory for the CLI process.
    pub cwd: Option<PathBuf>,
    /// Variables layered on top of the custom ones; typically provider
    /// credentials, which user-supplied variables must not shadow.
    pub extra_env: BTreeMap<String, String>,
}

impl RuntimeContext {
    /// Resolved temp directory.
    #[must_use]
    pub fn tmp_dir(&self) -> PathBuf {
        self.tmp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Fully validated invocation derived from [`RunOptions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedInvocation {
    /// Ordered CLI arguments, base flags first.
    pub args: Vec<OsString>,
    /// File whose bytes are streamed to the CLI's stdin.
    pub prompt_path: PathBuf,
    /// Custom variables parsed from [`RunOptions::claude_env`].
    pub env: BTreeMap<String, String>,
    /// Wall-clock budget before the CLI is terminated.
    pub timeout: Duration,
}

/// Overall outcome of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conclusion {
    /// The CLI exited with code 0.
    Success,
    /// Any other exit, spawn failure or timeout.
    Failure,
}

impl Conclusion {
    /// Maps an exit code to a conclusion; only `0` is a success.
    #[must_use]
    pub const fn from_exit_code(code: i32) -> Self {
        if code == 0 {
            Self::Success
        } else {
            Self::Failure
        }
    }

    /// Lower-case label used for output variables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the wait on the CLI process ended. Exactly one is produced per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The process exited on its own.
    Exited(i32),
    /// The timeout fired before the process exited.
    TimedOut,
    /// The process could not be spawned or awaited.
    SpawnError,
}

impl Settlement {
    /// Exit code reported for this settlement.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::TimedOut => TIMEOUT_EXIT_CODE,
            Self::SpawnError => SPAWN_FAILURE_EXIT_CODE,
        }
    }
}

/// Result of one completed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// `success` iff the exit code is exactly 0.
    pub conclusion: Conclusion,
    /// Persisted execution log, present only if output was captured.
    pub execution_file: Option<PathBuf>,
    /// Exit code, including the 124 timeout sentinel.
    pub exit_code: i32,
}
