//! Access to task inputs and pipeline variables as the agent exposes them.
//!
//! The agent maps input `name` to `INPUT_NAME` and variable `A.B` to `A_B`;
//! secret variables arrive as `SECRET_A_B`.

use std::collections::BTreeMap;

fn env_key(name: &str) -> String {
    name.replace(['.', ' '], "_").to_uppercase()
}

fn cleaned(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Source of raw agent-provided values.
pub trait TaskEnvironment {
    /// Raw value of the environment key, if set.
    fn raw(&self, key: &str) -> Option<String>;

    /// Trimmed task input; empty counts as unset.
    fn input(&self, name: &str) -> Option<String> {
        cleaned(self.raw(&format!("INPUT_{}", env_key(name))))
    }

    /// Boolean task input; only `true` (any case) is true.
    fn bool_input(&self, name: &str) -> bool {
        self.input(name)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Trimmed pipeline variable, falling back to its secret form.
    fn variable(&self, name: &str) -> Option<String> {
        let key = env_key(name);
        cleaned(self.raw(&key)).or_else(|| cleaned(self.raw(&format!("SECRET_{key}"))))
    }
}

/// Reads from the current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl TaskEnvironment for ProcessEnvironment {
    fn raw(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl TaskEnvironment for BTreeMap<String, String> {
    fn raw(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn inputs_are_upper_cased_and_trimmed() {
        let env = env(&[("INPUT_MAX_TURNS", " 5 "), ("INPUT_PROMPT", "   ")]);
        assert_eq!(env.input("max_turns").as_deref(), Some("5"));
        assert_eq!(env.input("prompt"), None);
        assert_eq!(env.input("missing"), None);
    }

    #[test]
    fn bool_inputs_accept_only_true() {
        let env = env(&[("INPUT_A", "True"), ("INPUT_B", "yes"), ("INPUT_C", "false")]);
        assert!(env.bool_input("a"));
        assert!(!env.bool_input("b"));
        assert!(!env.bool_input("c"));
        assert!(!env.bool_input("d"));
    }

    #[test]
    fn variables_map_dots_and_fall_back_to_secrets() {
        let env = env(&[
            ("AGENT_TEMPDIRECTORY", "/agent/_temp"),
            ("SECRET_SYSTEM_ACCESSTOKEN", "tok"),
        ]);
        assert_eq!(env.variable("Agent.TempDirectory").as_deref(), Some("/agent/_temp"));
        assert_eq!(env.variable("System.AccessToken").as_deref(), Some("tok"));
    }
}
