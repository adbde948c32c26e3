//! Argument assembly and option validation for CLI invocations.

use crate::env::parse_custom_env_vars;
use crate::error::ClaudeError;
use crate::types::{PreparedInvocation, RunOptions, DEFAULT_TIMEOUT_MINUTES};
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

/// Flags passed on every invocation: print mode, verbose, JSON-lines stream.
pub const BASE_ARGS: [&str; 4] = ["-p", "--verbose", "--output-format", "stream-json"];

/// Returns the option value unless it is unset or empty.
fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

/// Parses a strictly positive integer option.
///
/// # Errors
///
/// Returns `ClaudeError::InvalidConfig` naming the option when the text is
/// not a positive integer.
pub fn parse_positive(name: &str, raw: &str) -> Result<u64, ClaudeError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ClaudeError::InvalidConfig(format!(
            "{name} must be a positive number, got: {raw}"
        ))),
    }
}

/// Validates `options` and derives the arguments, custom environment and
/// timeout for one run. Nothing is spawned here.
///
/// # Errors
///
/// Returns `ClaudeError::InvalidConfig` when `max_turns` or
/// `timeout_minutes` is present but not a positive integer.
pub fn prepare_invocation(
    prompt_path: &Path,
    options: &RunOptions,
) -> Result<PreparedInvocation, ClaudeError> {
    let mut args: Vec<OsString> = BASE_ARGS.iter().map(OsString::from).collect();

    let mut push_flag = |flag: &str, value: &str| {
        args.push(OsString::from(flag));
        args.push(OsString::from(value));
    };

    if let Some(tools) = present(options.allowed_tools.as_ref()) {
        push_flag("--allowedTools", tools);
    }
    if let Some(tools) = present(options.disallowed_tools.as_ref()) {
        push_flag("--disallowedTools", tools);
    }
    if let Some(raw) = present(options.max_turns.as_ref()) {
        let turns = parse_positive("maxTurns", raw)?;
        push_flag("--max-turns", &turns.to_string());
    }
    if let Some(mcp) = present(options.mcp_config.as_ref()) {
        push_flag("--mcp-config", mcp);
    }
    if let Some(prompt) = present(options.system_prompt.as_ref()) {
        push_flag("--system-prompt", prompt);
    }
    if let Some(prompt) = present(options.append_system_prompt.as_ref()) {
        push_flag("--append-system-prompt", prompt);
    }
    if let Some(model) = present(options.fallback_model.as_ref()) {
        push_flag("--fallback-model", model);
    }

    let minutes = match present(options.timeout_minutes.as_ref()) {
        Some(raw) => parse_positive("timeoutMinutes", raw)?,
        None => DEFAULT_TIMEOUT_MINUTES,
    };

    Ok(PreparedInvocation {
        args,
        prompt_path: prompt_path.to_path_buf(),
        env: parse_custom_env_vars(options.claude_env.as_deref()),
        timeout: Duration::from_secs(minutes.saturating_mul(60)),
    })
}
