use thiserror::Error;

/// Errors raised while posting review threads.
///
/// Extraction never errors: unreadable or malformed input yields no issues.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Invalid pull request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Azure DevOps API returned {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("Request to Azure DevOps failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to encode thread payload: {0}")]
    Encode(#[from] serde_json::Error),
}
