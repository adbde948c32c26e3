//! Provider and prompt configuration checks.
//!
//! Callers read their own sources (task inputs, process environment) into a
//! [`ValidationConfig`]; this module only decides which combinations are
//! acceptable.

use crate::error::ClaudeError;

/// Snapshot of the provider selection and credentials to validate.
///
/// `google_application_credentials`, `prompt` and `prompt_file` distinguish
/// "not passed" (`None`) from "passed but empty" (`Some("")`): callers
/// without those concepts leave them `None` and the checks are skipped.
#[derive(Debug, Clone, Default)]
pub struct ValidationConfig {
    /// Route requests through AWS Bedrock.
    pub use_bedrock: bool,
    /// Route requests through Google Vertex AI.
    pub use_vertex: bool,
    /// Direct Anthropic API key.
    pub anthropic_api_key: Option<String>,
    /// Claude Code OAuth token.
    pub claude_code_oauth_token: Option<String>,
    /// AWS region for Bedrock.
    pub aws_region: Option<String>,
    /// AWS access key id for Bedrock.
    pub aws_access_key_id: Option<String>,
    /// AWS secret access key for Bedrock.
    pub aws_secret_access_key: Option<String>,
    /// GCP project id for Vertex.
    pub vertex_project_id: Option<String>,
    /// GCP region for Vertex.
    pub vertex_region: Option<String>,
    /// Service-account credentials path for Vertex.
    pub google_application_credentials: Option<String>,
    /// Inline prompt text.
    pub prompt: Option<String>,
    /// Path to a prompt file.
    pub prompt_file: Option<String>,
}

impl ValidationConfig {
    /// Reads the variables the CLI itself honours through `lookup`, for runs
    /// configured by environment rather than task inputs. Providers are
    /// selected with `CLAUDE_CODE_USE_BEDROCK=1` / `CLAUDE_CODE_USE_VERTEX=1`;
    /// the credentials path and prompt checks do not apply.
    #[must_use]
    pub fn from_env_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| lookup(key).is_some_and(|v| v == "1");
        Self {
            use_bedrock: flag("CLAUDE_CODE_USE_BEDROCK"),
            use_vertex: flag("CLAUDE_CODE_USE_VERTEX"),
            anthropic_api_key: lookup("ANTHROPIC_API_KEY"),
            claude_code_oauth_token: lookup("CLAUDE_CODE_OAUTH_TOKEN"),
            aws_region: lookup("AWS_REGION"),
            aws_access_key_id: lookup("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: lookup("AWS_SECRET_ACCESS_KEY"),
            vertex_project_id: lookup("ANTHROPIC_VERTEX_PROJECT_ID"),
            vertex_region: lookup("CLOUD_ML_REGION"),
            google_application_credentials: None,
            prompt: None,
            prompt_file: None,
        }
    }

    /// [`ValidationConfig::from_env_vars`] over the current process.
    #[must_use]
    pub fn from_process_env() -> Self {
        Self::from_env_vars(|key| std::env::var(key).ok())
    }
}

fn is_set(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Returns every configuration problem in a stable order; empty means valid.
#[must_use]
pub fn validate_config(config: &ValidationConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.use_bedrock && config.use_vertex {
        // Branch checks below would both fire; report only the conflict.
        errors.push(
            "Cannot use both Bedrock and Vertex AI simultaneously. Please set only one provider."
                .to_string(),
        );
        return errors;
    }

    if config.use_bedrock {
        if !is_set(config.aws_region.as_ref()) {
            errors.push("AWS_REGION is required when using AWS Bedrock.".to_string());
        }
        if !is_set(config.aws_access_key_id.as_ref()) {
            errors.push("AWS_ACCESS_KEY_ID is required when using AWS Bedrock.".to_string());
        }
        if !is_set(config.aws_secret_access_key.as_ref()) {
            errors.push("AWS_SECRET_ACCESS_KEY is required when using AWS Bedrock.".to_string());
        }
    } else if config.use_vertex {
        if !is_set(config.vertex_project_id.as_ref()) {
            errors.push(
                "ANTHROPIC_VERTEX_PROJECT_ID is required when using Google Vertex AI.".to_string(),
            );
        }
        if !is_set(config.vertex_region.as_ref()) {
            errors.push("CLOUD_ML_REGION is required when using Google Vertex AI.".to_string());
        }
        if config
            .google_application_credentials
            .as_ref()
            .is_some_and(String::is_empty)
        {
            errors.push(
                "GOOGLE_APPLICATION_CREDENTIALS must be configured as a pipeline variable when using Google Vertex AI."
                    .to_string(),
            );
        }
    } else if !is_set(config.anthropic_api_key.as_ref())
        && !is_set(config.claude_code_oauth_token.as_ref())
    {
        errors.push(
            "Either ANTHROPIC_API_KEY or CLAUDE_CODE_OAUTH_TOKEN is required when using direct Anthropic API."
                .to_string(),
        );
    }

    if config.prompt.is_some() || config.prompt_file.is_some() {
        let has_prompt = config.prompt.as_deref().is_some_and(|p| !p.trim().is_empty());
        let has_prompt_file = is_set(config.prompt_file.as_ref());

        match (has_prompt, has_prompt_file) {
            (false, false) => {
                errors.push("Either 'prompt' or 'prompt_file' input is required.".to_string());
            }
            (true, true) => errors.push(
                "Both 'prompt' and 'prompt_file' inputs were provided. Please specify only one."
                    .to_string(),
            ),
            _ => {}
        }
    }

    errors
}

/// [`validate_config`] over task inputs, as a `Result`.
///
/// # Errors
///
/// Returns `ClaudeError::ValidationFailed` with every problem found.
pub fn ensure_valid(config: &ValidationConfig) -> Result<(), ClaudeError> {
    let errors = validate_config(config);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ClaudeError::ValidationFailed(errors))
    }
}

/// [`validate_config`] over environment variables, as a `Result`.
///
/// # Errors
///
/// Returns `ClaudeError::EnvValidationFailed` with every problem found.
pub fn ensure_env_valid(config: &ValidationConfig) -> Result<(), ClaudeError> {
    let errors = validate_config(config);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ClaudeError::EnvValidationFailed(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_key() -> ValidationConfig {
        ValidationConfig {
            anthropic_api_key: Some("sk-test".into()),
            ..ValidationConfig::default()
        }
    }

    fn bedrock() -> ValidationConfig {
        ValidationConfig {
            use_bedrock: true,
            aws_region: Some("us-east-1".into()),
            aws_access_key_id: Some("AKIA".into()),
            aws_secret_access_key: Some("secret".into()),
            ..ValidationConfig::default()
        }
    }

    fn vertex() -> ValidationConfig {
        ValidationConfig {
            use_vertex: true,
            vertex_project_id: Some("proj".into()),
            vertex_region: Some("us-east5".into()),
            ..ValidationConfig::default()
        }
    }

    #[test]
    fn direct_api_accepts_key_or_token() {
        assert!(validate_config(&api_key()).is_empty());
        let token = ValidationConfig {
            claude_code_oauth_token: Some("oauth".into()),
            ..ValidationConfig::default()
        };
        assert!(validate_config(&token).is_empty());
    }

    #[test]
    fn direct_api_requires_a_credential() {
        let errors = validate_config(&ValidationConfig {
            anthropic_api_key: Some(String::new()),
            ..ValidationConfig::default()
        });
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn bedrock_reports_every_missing_field() {
        assert!(validate_config(&bedrock()).is_empty());
        let errors = validate_config(&ValidationConfig {
            use_bedrock: true,
            ..ValidationConfig::default()
        });
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("AWS_REGION"));
        assert!(errors[1].contains("AWS_ACCESS_KEY_ID"));
        assert!(errors[2].contains("AWS_SECRET_ACCESS_KEY"));
    }

    #[test]
    fn vertex_credentials_check_only_when_passed() {
        assert!(validate_config(&vertex()).is_empty());

        let errors = validate_config(&ValidationConfig {
            google_application_credentials: Some(String::new()),
            ..vertex()
        });
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("GOOGLE_APPLICATION_CREDENTIALS"));

        let ok = ValidationConfig {
            google_application_credentials: Some("/creds.json".into()),
            ..vertex()
        };
        assert!(validate_config(&ok).is_empty());
    }

    #[test]
    fn vertex_reports_every_missing_field() {
        let errors = validate_config(&ValidationConfig {
            use_vertex: true,
            google_application_credentials: Some(String::new()),
            ..ValidationConfig::default()
        });
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn both_providers_is_a_single_error() {
        let errors = validate_config(&ValidationConfig {
            use_bedrock: true,
            use_vertex: true,
            prompt: Some(String::new()),
            ..ValidationConfig::default()
        });
        assert_eq!(
            errors,
            vec!["Cannot use both Bedrock and Vertex AI simultaneously. Please set only one provider."]
        );
    }

    #[test]
    fn prompt_checks_skipped_when_not_passed() {
        assert!(validate_config(&api_key()).is_empty());
    }

    #[test]
    fn prompt_requires_exactly_one_source() {
        let only_prompt = ValidationConfig {
            prompt: Some("review this".into()),
            prompt_file: Some(String::new()),
            ..api_key()
        };
        assert!(validate_config(&only_prompt).is_empty());

        let only_file = ValidationConfig {
            prompt_file: Some("prompt.md".into()),
            ..api_key()
        };
        assert!(validate_config(&only_file).is_empty());

        let blank = ValidationConfig {
            prompt: Some("   ".into()),
            ..api_key()
        };
        assert_eq!(
            validate_config(&blank),
            vec!["Either 'prompt' or 'prompt_file' input is required."]
        );

        let both = ValidationConfig {
            prompt: Some("x".into()),
            prompt_file: Some("y".into()),
            ..api_key()
        };
        let errors = validate_config(&both);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Both 'prompt' and 'prompt_file'"));
    }

    #[test]
    fn ensure_valid_itemizes_every_error() {
        let err = ensure_valid(&ValidationConfig {
            use_bedrock: true,
            ..ValidationConfig::default()
        })
        .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Task input validation failed:\n  - "));
        assert!(message.contains("  - AWS_REGION is required"));
        assert!(ensure_valid(&api_key()).is_ok());
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_vars_select_provider_with_one() {
        let config = ValidationConfig::from_env_vars(vars(&[
            ("CLAUDE_CODE_USE_VERTEX", "1"),
            ("CLAUDE_CODE_USE_BEDROCK", "true"),
            ("ANTHROPIC_VERTEX_PROJECT_ID", "proj"),
            ("CLOUD_ML_REGION", "us-east5"),
        ]));
        assert!(config.use_vertex);
        assert!(!config.use_bedrock);
        // Credentials path and prompt are not part of the environment contract.
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn env_vars_without_credentials_fail_with_env_wording() {
        let err = ensure_env_valid(&ValidationConfig::from_env_vars(vars(&[]))).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Environment variable validation failed:\n  - "));
        assert!(message.contains("ANTHROPIC_API_KEY or CLAUDE_CODE_OAUTH_TOKEN"));
    }
}
