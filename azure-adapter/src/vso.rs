//! Azure Pipelines logging commands.

use std::fmt;

/// Final state reported for the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskResult {
    /// The task succeeded.
    Succeeded,
    /// The task failed.
    Failed,
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
        })
    }
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%AZP25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(']', "%5D").replace(';', "%3B")
}

/// `##vso[task.setvariable variable=NAME]VALUE`
#[must_use]
pub fn set_variable_command(name: &str, value: &str) -> String {
    format!(
        "##vso[task.setvariable variable={}]{}",
        escape_property(name),
        escape_data(value)
    )
}

/// `##vso[task.complete result=RESULT;]MESSAGE`
#[must_use]
pub fn complete_command(result: TaskResult, message: &str) -> String {
    format!("##vso[task.complete result={result};]{}", escape_data(message))
}

/// Emits a `task.setvariable` command on stdout.
pub fn set_variable(name: &str, value: &str) {
    println!("{}", set_variable_command(name, value));
}

/// Emits a `task.complete` command on stdout.
pub fn set_result(result: TaskResult, message: &str) {
    println!("{}", complete_command(result, message));
}
