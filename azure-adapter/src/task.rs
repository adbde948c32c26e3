//! The pipeline entry flow: read inputs, validate, prepare, run, report.

use crate::comments::post_pr_review_comments;
use crate::inputs::TaskEnvironment;
use crate::prompt::prepare_prompt;
use crate::settings::setup_claude_code_settings;
use crate::setup::{ensure_claude_installed, AgentDirs};
use crate::vso::{self, TaskResult};
use anyhow::Context;
use claudecode_adapter::{
    ensure_env_valid, ensure_valid, resolve_claude, run_claude, Conclusion, RunOptions, RunResult,
    RuntimeContext, ValidationConfig,
};
use pr_review::{
    build_reviewer_system_prompt, join_prompt_sections, HttpTransport, ReviewerKind,
    PR_ISSUES_INSTRUCTION,
};
use std::collections::BTreeMap;

/// Boolean input enabling issue extraction and PR comment posting.
pub const POST_PR_COMMENTS_INPUT: &str = "post_pr_comments";

/// Input that enables `kind`'s built-in reviewer prompt.
#[must_use]
pub const fn reviewer_input(kind: ReviewerKind) -> &'static str {
    match kind {
        ReviewerKind::Terraform => "review_terraform",
        ReviewerKind::Yaml => "review_yaml",
    }
}

/// Provider selection and credentials as the validator sees them.
///
/// The credentials path and both prompt fields are always passed so that
/// their checks run.
pub fn validation_config(env: &dyn TaskEnvironment) -> ValidationConfig {
    ValidationConfig {
        use_bedrock: env.bool_input("use_bedrock"),
        use_vertex: env.bool_input("use_vertex"),
        anthropic_api_key: anthropic_api_key(env),
        claude_code_oauth_token: env.input("claude_code_oauth_token"),
        aws_region: env.input("aws_region"),
        aws_access_key_id: env.variable("AWS_ACCESS_KEY_ID"),
        aws_secret_access_key: env.variable("AWS_SECRET_ACCESS_KEY"),
        vertex_project_id: env.input("gcp_project_id"),
        vertex_region: env.input("gcp_region"),
        google_application_credentials: Some(
            env.variable("GOOGLE_APPLICATION_CREDENTIALS")
                .unwrap_or_default(),
        ),
        prompt: Some(env.input("prompt").unwrap_or_default()),
        prompt_file: Some(env.input("prompt_file").unwrap_or_default()),
    }
}

fn anthropic_api_key(env: &dyn TaskEnvironment) -> Option<String> {
    env.input("anthropic_api_key")
        .or_else(|| env.variable("ANTHROPIC_API_KEY"))
}

/// Reviewer personas switched on by their inputs.
pub fn enabled_reviewers(env: &dyn TaskEnvironment) -> Vec<ReviewerKind> {
    ReviewerKind::ALL
        .into_iter()
        .filter(|kind| env.bool_input(reviewer_input(*kind)))
        .collect()
}

/// CLI options from task inputs. Reviewer prompts and, when comment posting
/// is on, the issue-block instruction are appended to `append_system_prompt`.
pub fn run_options(env: &dyn TaskEnvironment) -> RunOptions {
    let reviewers = build_reviewer_system_prompt(&enabled_reviewers(env));
    let user_append = env.input("append_system_prompt").unwrap_or_default();
    let instruction = if env.bool_input(POST_PR_COMMENTS_INPUT) {
        PR_ISSUES_INSTRUCTION
    } else {
        ""
    };

    let append = join_prompt_sections([user_append.as_str(), reviewers.as_str(), instruction]);

    RunOptions {
        allowed_tools: env.input("allowed_tools"),
        disallowed_tools: env.input("disallowed_tools"),
        max_turns: env.input("max_turns"),
        mcp_config: env.input("mcp_config"),
        system_prompt: env.input("system_prompt"),
        append_system_prompt: (!append.is_empty()).then_some(append),
        claude_env: env.input("claude_env"),
        fallback_model: env.input("fallback_model"),
        timeout_minutes: env.input("timeout_minutes"),
    }
}

/// Provider variables handed to the CLI on top of its environment.
/// Unset values are left out rather than exported empty.
pub fn provider_env(env: &dyn TaskEnvironment) -> BTreeMap<String, String> {
    let flag = |on: bool| on.then(|| "1".to_string());

    [
        ("CLAUDE_CODE_AZURE_TASK", Some("1".to_string())),
        ("ANTHROPIC_MODEL", env.input("model")),
        ("ANTHROPIC_API_KEY", anthropic_api_key(env)),
        ("CLAUDE_CODE_OAUTH_TOKEN", env.input("claude_code_oauth_token")),
        ("CLAUDE_CODE_USE_BEDROCK", flag(env.bool_input("use_bedrock"))),
        ("CLAUDE_CODE_USE_VERTEX", flag(env.bool_input("use_vertex"))),
        (
            "AWS_REGION",
            env.input("aws_region").or_else(|| env.variable("AWS_REGION")),
        ),
        ("AWS_ACCESS_KEY_ID", env.variable("AWS_ACCESS_KEY_ID")),
        ("AWS_SECRET_ACCESS_KEY", env.variable("AWS_SECRET_ACCESS_KEY")),
        ("ANTHROPIC_VERTEX_PROJECT_ID", env.input("gcp_project_id")),
        ("CLOUD_ML_REGION", env.input("gcp_region")),
        (
            "GOOGLE_APPLICATION_CREDENTIALS",
            env.variable("GOOGLE_APPLICATION_CREDENTIALS"),
        ),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
    .collect()
}

/// Runtime for the CLI: agent temp dir for the pipe and log, and the agent
/// directories exported next to the provider variables. The CLI path is
/// left to discovery at spawn time, after any install.
pub fn runtime_context(env: &dyn TaskEnvironment, dirs: &AgentDirs) -> RuntimeContext {
    let mut extra_env = dirs.exported_env();
    extra_env.extend(provider_env(env));

    RuntimeContext {
        claude_path: None,
        tmp_dir: Some(dirs.temp_dir.clone()),
        cwd: None,
        extra_env,
    }
}

/// Checks the inputs without running anything.
///
/// # Errors
///
/// Returns the itemized validation failure.
pub fn validate_inputs(env: &dyn TaskEnvironment) -> anyhow::Result<()> {
    ensure_valid(&validation_config(env))?;
    Ok(())
}

/// Inputs whose presence marks a run configured through the task UI.
const TASK_INPUTS: [&str; 9] = [
    "prompt",
    "prompt_file",
    "anthropic_api_key",
    "claude_code_oauth_token",
    "use_bedrock",
    "use_vertex",
    "aws_region",
    "gcp_project_id",
    "gcp_region",
];

/// Validates task inputs when any are set, otherwise the provider variables
/// of the environment the CLI would inherit.
///
/// # Errors
///
/// Returns the itemized validation failure.
pub fn validate(env: &dyn TaskEnvironment) -> anyhow::Result<()> {
    if TASK_INPUTS.iter().any(|name| env.input(name).is_some()) {
        return validate_inputs(env);
    }
    tracing::info!("No task inputs set; validating environment variables");
    ensure_env_valid(&ValidationConfig::from_env_vars(|key| env.raw(key)))?;
    Ok(())
}

/// Full task: agent setup, validation, settings, prompt, run, comments.
///
/// # Errors
///
/// Any failure before the CLI is started. A failing CLI run is reported
/// through the returned [`RunResult`].
pub async fn run_task(env: &dyn TaskEnvironment) -> anyhow::Result<RunResult> {
    let dirs = AgentDirs::resolve(env);
    ensure_claude_installed(&resolve_claude(None)).await?;

    validate_inputs(env)?;

    let home = dirs::home_dir().context("could not determine the home directory")?;
    setup_claude_code_settings(&home)?;

    let prompt_path = prepare_prompt(
        env.input("prompt").as_deref(),
        env.input("prompt_file").as_deref(),
        &dirs.temp_dir,
    )
    .await?;

    let runtime = runtime_context(env, &dirs);
    let result = run_claude(&prompt_path, &run_options(env), &runtime).await?;

    if env.bool_input(POST_PR_COMMENTS_INPUT) {
        if let Some(file) = &result.execution_file {
            post_pr_review_comments(env, file, &HttpTransport::default()).await;
        }
    }

    Ok(result)
}

/// Publishes the run's output variables and task result.
/// Returns the process exit code.
pub fn report(result: &RunResult) -> i32 {
    vso::set_variable("conclusion", result.conclusion.as_str());
    if let Some(file) = &result.execution_file {
        vso::set_variable("execution_file", &file.to_string_lossy());
    }

    if result.conclusion == Conclusion::Success {
        vso::set_result(TaskResult::Succeeded, "Claude Code executed successfully");
        0
    } else {
        vso::set_result(
            TaskResult::Failed,
            &format!("Claude Code failed with exit code: {}", result.exit_code),
        );
        result.exit_code
    }
}

/// Reports an error that stopped the task before or around the run.
pub fn report_error(error: &anyhow::Error) -> i32 {
    tracing::error!("{error:#}");
    vso::set_result(TaskResult::Failed, &format!("Task failed with error: {error:#}"));
    vso::set_variable("conclusion", Conclusion::Failure.as_str());
    1
}
