//! Sequential posting of every extracted issue.

use crate::post::{post_issue_thread, ThreadTransport};
use crate::types::{PrConfig, ReviewIssue};

/// Outcome counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostSummary {
    /// Threads created.
    pub posted: usize,
    /// Threads that failed; each failure was logged.
    pub failed: usize,
}

/// Posts each issue as its own thread, one request at a time.
///
/// A failed post is logged and skipped; the remaining issues are still
/// posted. There is no rollback of threads already created.
pub async fn post_review_comments(
    config: &PrConfig,
    issues: &[ReviewIssue],
    transport: &dyn ThreadTransport,
) -> PostSummary {
    let mut summary = PostSummary::default();

    for issue in issues {
        match post_issue_thread(config, issue, transport).await {
            Ok(()) => {
                summary.posted += 1;
                tracing::info!("  Posted [{}] thread at {}", issue.severity, issue.location());
            }
            Err(e) => {
                summary.failed += 1;
                tracing::warn!("  Failed to post [{}] thread: {e}", issue.severity);
            }
        }
    }

    summary
}
