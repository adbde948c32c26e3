//! Built-in reviewer personas selectable from task inputs.

/// A reviewer persona with its own system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewerKind {
    /// Terraform modules and variable files.
    Terraform,
    /// YAML manifests, Helm values and pipeline definitions.
    Yaml,
}

impl ReviewerKind {
    /// Every built-in reviewer, in prompt order.
    pub const ALL: [Self; 2] = [Self::Terraform, Self::Yaml];

    /// System prompt appended when this reviewer is enabled.
    #[must_use]
    pub fn system_prompt(self) -> &'static str {
        match self {
            Self::Terraform => include_str!("../prompts/terraform.md").trim_end(),
            Self::Yaml => include_str!("../prompts/yaml.md").trim_end(),
        }
    }
}

/// Concatenates the prompts of `enabled`, separated by a blank line.
/// Empty when nothing is enabled.
#[must_use]
pub fn build_reviewer_system_prompt(enabled: &[ReviewerKind]) -> String {
    enabled
        .iter()
        .map(|kind| kind.system_prompt())
        .collect::<Vec<_>>()
        .join("\n\n")
}
