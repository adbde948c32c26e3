//! Runs the Claude Code CLI as a CI subprocess.
//!
//! This crate validates provider configuration, assembles the CLI arguments,
//! streams the prompt through a named pipe, echoes and captures the
//! JSON-lines output, enforces a timeout with graceful termination, and
//! persists the captured stream as an execution log.

/// Command-line argument construction and option validation.
pub mod cmd;
/// Discovery and resolution of the Claude CLI executable path.
pub mod discovery;
/// Parsing of custom `KEY: value` environment variables.
pub mod env;
/// Error types returned by runner operations.
pub mod error;
/// Execution-log persistence and tolerant JSON-lines parsing.
pub mod execution_log;
/// Named-pipe prompt delivery.
pub mod fifo;
/// Subprocess execution with streaming, timeouts, and signal handling.
pub mod process;
/// Shared data types for options, invocations and results.
pub mod types;
/// Provider credential and prompt validation.
pub mod validate;

pub use cmd::{prepare_invocation, BASE_ARGS};
pub use discovery::{discover_claude, resolve_claude, CLAUDE_BIN_ENV_VAR};
pub use env::parse_custom_env_vars;
pub use error::ClaudeError;
pub use execution_log::{parse_log_lines, parse_optional, EXECUTION_LOG_FILE};
pub use process::{run_claude, run_prepared};
pub use types::*;
pub use validate::{ensure_env_valid, ensure_valid, validate_config, ValidationConfig};
