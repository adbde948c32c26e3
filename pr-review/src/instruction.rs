//! Output contract that makes review findings machine-readable.

/// Appended to the system prompt when comment posting is enabled. Asks the
/// reviewer to end with a fenced JSON array of issues, `[]` when clean.
pub const PR_ISSUES_INSTRUCTION: &str = r#"After completing your review, you MUST end your response with a fenced JSON block containing all issues found.
The block must be the very last thing in your response, using exactly this format:

```json
[
  {
    "severity": "CRITICAL" | "WARNING" | "SUGGESTION",
    "file": "path/to/file.tf",
    "line": 42,
    "description": "Clear description of the issue"
  }
]
```

Rules:
- "file" and "line" are optional - only include when the issue maps to a specific location
- If no issues are found, emit an empty array: []
- Do not include any text after the closing ```"#;

/// Joins non-empty system-prompt sections with a blank line.
#[must_use]
pub fn join_prompt_sections<'a>(sections: impl IntoIterator<Item = &'a str>) -> String {
    sections
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_example_is_the_last_fence() {
        assert!(PR_ISSUES_INSTRUCTION.contains("```json"));
        assert!(PR_ISSUES_INSTRUCTION.trim_end().ends_with("```"));
    }

    #[test]
    fn join_skips_blank_sections() {
        assert_eq!(join_prompt_sections(["a", "  ", "", "b\n"]), "a\n\nb");
        assert_eq!(join_prompt_sections([]), "");
    }
}
