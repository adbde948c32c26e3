//! Posting of extracted review issues to the pull request that triggered the
//! build. Nothing here fails the task.

use crate::inputs::TaskEnvironment;
use pr_review::{extract_issues, post_review_comments, PrConfig, ThreadTransport};
use std::path::Path;

/// Builds the pull request coordinates from pipeline variables.
///
/// `None` (with a log line) outside PR builds or when any variable is missing.
pub fn pr_config_from_env(env: &dyn TaskEnvironment) -> Option<PrConfig> {
    let Some(pr_id) = env.variable("System.PullRequest.PullRequestId") else {
        tracing::info!("Not a PR run, skipping comment post");
        return None;
    };

    let collection_uri = env.variable("System.CollectionUri");
    let project = env.variable("System.TeamProject");
    let repo_id = env.variable("Build.Repository.ID");
    let access_token = env.variable("System.AccessToken");

    match (collection_uri, project, repo_id, access_token) {
        (Some(collection_uri), Some(project), Some(repo_id), Some(access_token)) => {
            Some(PrConfig {
                collection_uri,
                project,
                repo_id,
                pr_id,
                access_token,
            })
        }
        _ => {
            tracing::info!("Missing required pipeline variables for PR comment posting, skipping");
            None
        }
    }
}

/// Extracts issues from `execution_file` and posts one thread per issue.
/// Returns the number of threads created.
pub async fn post_pr_review_comments(
    env: &dyn TaskEnvironment,
    execution_file: &Path,
    transport: &dyn ThreadTransport,
) -> usize {
    let Some(config) = pr_config_from_env(env) else {
        return 0;
    };

    let issues = extract_issues(execution_file).await;
    if issues.is_empty() {
        tracing::info!("No issues found, skipping comment post");
        return 0;
    }

    tracing::info!(
        "Posting {} review comment(s) to PR #{}",
        issues.len(),
        config.pr_id
    );
    let summary = post_review_comments(&config, &issues, transport).await;
    if summary.failed > 0 {
        tracing::warn!(
            "{} of {} review comment(s) could not be posted",
            summary.failed,
            issues.len()
        );
    }
    summary.posted
}
