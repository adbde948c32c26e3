//! Azure DevOps pipeline task around the Claude Code runner.
//!
//! Reads task inputs and pipeline variables from the agent environment,
//! prepares the agent, runs the CLI through `claudecode-adapter`, and posts
//! review findings to the triggering pull request through `pr-review`.

/// PR comment posting from pipeline variables.
pub mod comments;
/// Task input and pipeline variable accessors.
pub mod inputs;
/// Prompt file preparation.
pub mod prompt;
/// User settings merge.
pub mod settings;
/// Agent directories and CLI installation.
pub mod setup;
/// The end-to-end task flow.
pub mod task;
/// `##vso` logging commands.
pub mod vso;

pub use inputs::{ProcessEnvironment, TaskEnvironment};
pub use task::{report, report_error, run_task, validate, validate_inputs};
