//! Turns a Claude review run into pull-request comment threads.
//!
//! The reviewer ends its answer with a fenced JSON array of issues; this
//! crate extracts that array from the execution log, validates each entry,
//! and posts one Azure DevOps thread per issue.

/// Sequential batch posting.
pub mod batch;
/// Error types for thread posting.
pub mod error;
/// Issue extraction from execution logs.
pub mod extract;
/// Prompt text that defines the issue block contract.
pub mod instruction;
/// Thread payloads, auth and transport.
pub mod post;
/// Built-in reviewer system prompts.
pub mod reviewers;
/// Review issue and pull request types.
pub mod types;

pub use batch::{post_review_comments, PostSummary};
pub use error::ReviewError;
pub use extract::{extract_issues, issues_from_result_text};
pub use instruction::{join_prompt_sections, PR_ISSUES_INSTRUCTION};
pub use post::{basic_auth_header, post_issue_thread, HttpTransport, ThreadPayload, ThreadTransport};
pub use reviewers::{build_reviewer_system_prompt, ReviewerKind};
pub use types::{PrConfig, ReviewIssue, Severity};
