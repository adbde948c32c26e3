//! Creation of pull-request comment threads through the Azure DevOps REST API.

use crate::error::ReviewError;
use crate::types::{PrConfig, ReviewIssue};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Url;
use serde::Serialize;

/// REST API version sent with every thread request.
pub const API_VERSION: &str = "7.1";

const THREAD_STATUS_ACTIVE: u8 = 1;
const COMMENT_TYPE_TEXT: u8 = 1;
const ERROR_BODY_LIMIT: usize = 200;

/// Request body for `POST .../pullRequests/{id}/threads`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPayload {
    /// Exactly one top-level comment.
    pub comments: Vec<ThreadComment>,
    /// Thread status; always active.
    pub status: u8,
    /// Location anchor; absent for general comments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_context: Option<ThreadContext>,
}

/// A single comment inside a new thread.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThreadComment {
    /// `0` starts a new thread.
    pub parent_comment_id: u32,
    /// `[SEVERITY] description`.
    pub content: String,
    /// Plain text comment.
    pub comment_type: u8,
}

/// File and line a thread is anchored to.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThreadContext {
    /// Repository path with a leading `/`.
    pub file_path: String,
    /// Start anchor in the changed file.
    pub right_file_start: FilePosition,
    /// End anchor in the changed file.
    pub right_file_end: FilePosition,
}

/// A line/column position in a diff.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FilePosition {
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub offset: u32,
}

impl ThreadPayload {
    /// Builds the thread for `issue`, anchored only when both file and line
    /// are known.
    #[must_use]
    pub fn for_issue(issue: &ReviewIssue) -> Self {
        let thread_context = match (&issue.file, issue.anchor_line()) {
            (Some(file), Some(line)) if !file.is_empty() => {
                let anchor = FilePosition { line, offset: 1 };
                Some(ThreadContext {
                    file_path: if file.starts_with('/') {
                        file.clone()
                    } else {
                        format!("/{file}")
                    },
                    right_file_start: anchor,
                    right_file_end: anchor,
                })
            }
            _ => None,
        };

        Self {
            comments: vec![ThreadComment {
                parent_comment_id: 0,
                content: format!("[{}] {}", issue.severity, issue.description),
                comment_type: COMMENT_TYPE_TEXT,
            }],
            status: THREAD_STATUS_ACTIVE,
            thread_context,
        }
    }
}

impl PrConfig {
    /// `{collection}/{project}/_apis/git/repositories/{repo}/pullRequests/{pr}/threads?api-version=7.1`
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::InvalidUrl` if the collection URI cannot carry a
    /// path.
    pub fn threads_url(&self) -> Result<Url, ReviewError> {
        let invalid = |reason: String| ReviewError::InvalidUrl {
            url: self.collection_uri.clone(),
            reason,
        };

        let mut url = Url::parse(&self.collection_uri).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(&self.project)
            .extend(["_apis", "git", "repositories"])
            .push(&self.repo_id)
            .push("pullRequests")
            .push(&self.pr_id)
            .push("threads");
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }
}

/// `Basic base64(":" + token)`.
#[must_use]
pub fn basic_auth_header(token: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!(":{token}"));
    format!("Basic {encoded}")
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

/// Sends JSON POST requests on behalf of [`post_issue_thread`].
#[async_trait]
pub trait ThreadTransport: Send + Sync {
    /// POSTs `body` as `application/json` with the given `Authorization`
    /// header value.
    async fn post_json(
        &self,
        url: &Url,
        authorization: &str,
        body: String,
    ) -> Result<TransportResponse, ReviewError>;
}

/// [`ThreadTransport`] backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

#[async_trait]
impl ThreadTransport for HttpTransport {
    async fn post_json(
        &self,
        url: &Url,
        authorization: &str,
        body: String,
    ) -> Result<TransportResponse, ReviewError> {
        let response = self
            .client
            .post(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::AUTHORIZATION, authorization)
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(TransportResponse { status, body })
    }
}

/// Creates one thread for `issue` on the pull request.
///
/// # Errors
///
/// Returns `ReviewError::ApiStatus` with the status and the first 200
/// characters of the body for any non-2xx response, or the transport error.
pub async fn post_issue_thread(
    config: &PrConfig,
    issue: &ReviewIssue,
    transport: &dyn ThreadTransport,
) -> Result<(), ReviewError> {
    let url = config.threads_url()?;
    let body = serde_json::to_string(&ThreadPayload::for_issue(issue))?;
    let auth = basic_auth_header(&config.access_token);

    let response = transport.post_json(&url, &auth, body).await?;

    if (200..300).contains(&response.status) {
        Ok(())
    } else {
        Err(ReviewError::ApiStatus {
            status: response.status,
            body: response.body.chars().take(ERROR_BODY_LIMIT).collect(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::Severity;
    use serde_json::Value;
    use std::sync::Mutex;

    /// Records every request and answers with a fixed status.
    pub(crate) struct RecordingTransport {
        pub(crate) status: u16,
        pub(crate) response_body: String,
        pub(crate) requests: Mutex<Vec<(String, String, Value)>>,
    }

    impl RecordingTransport {
        pub(crate) fn answering(status: u16) -> Self {
            Self {
                status,
                response_body: String::new(),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn bodies(&self) -> Vec<Value> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|(_, _, body)| body.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ThreadTransport for RecordingTransport {
        async fn post_json(
            &self,
            url: &Url,
            authorization: &str,
            body: String,
        ) -> Result<TransportResponse, ReviewError> {
            let body: Value = serde_json::from_str(&body)?;
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), authorization.to_string(), body));
            Ok(TransportResponse {
                status: self.status,
                body: self.response_body.clone(),
            })
        }
    }

    pub(crate) fn config() -> PrConfig {
        PrConfig {
            collection_uri: "https://dev.azure.com/contoso/".into(),
            project: "Platform Team".into(),
            repo_id: "repo-guid".into(),
            pr_id: "42".into(),
            access_token: "secret-token".into(),
        }
    }

    fn issue(file: Option<&str>, line: Option<i64>) -> ReviewIssue {
        ReviewIssue {
            severity: Severity::Warning,
            file: file.map(str::to_string),
            line: line.map(serde_json::Number::from),
            description: "Pin the provider version".into(),
        }
    }

    #[test]
    fn threads_url_encodes_segments() {
        assert_eq!(
            config().threads_url().unwrap().as_str(),
            "https://dev.azure.com/contoso/Platform%20Team/_apis/git/repositories/repo-guid/pullRequests/42/threads?api-version=7.1"
        );
    }

    #[test]
    fn threads_url_without_trailing_slash() {
        let cfg = PrConfig {
            collection_uri: "https://tfs.example.com/DefaultCollection".into(),
            ..config()
        };
        assert!(cfg
            .threads_url()
            .unwrap()
            .as_str()
            .starts_with("https://tfs.example.com/DefaultCollection/Platform%20Team/_apis/"));
    }

    #[test]
    fn basic_auth_uses_empty_username() {
        // base64(":secret-token")
        assert_eq!(basic_auth_header("secret-token"), "Basic OnNlY3JldC10b2tlbg==");
    }

    #[tokio::test]
    async fn general_comment_has_no_thread_context() {
        let transport = RecordingTransport::answering(200);
        post_issue_thread(&config(), &issue(None, None), &transport)
            .await
            .unwrap();

        let body = &transport.bodies()[0];
        assert!(body.get("threadContext").is_none());
        assert_eq!(body["status"], 1);
        assert_eq!(body["comments"][0]["parentCommentId"], 0);
        assert_eq!(body["comments"][0]["commentType"], 1);
        assert_eq!(
            body["comments"][0]["content"],
            "[WARNING] Pin the provider version"
        );
    }

    #[tokio::test]
    async fn file_without_line_is_unanchored() {
        let transport = RecordingTransport::answering(201);
        post_issue_thread(&config(), &issue(Some("main.tf"), None), &transport)
            .await
            .unwrap();
        assert!(transport.bodies()[0].get("threadContext").is_none());
    }

    #[tokio::test]
    async fn anchored_comment_gets_leading_slash() {
        let transport = RecordingTransport::answering(200);
        post_issue_thread(&config(), &issue(Some("a.tf"), Some(5)), &transport)
            .await
            .unwrap();

        let ctx = &transport.bodies()[0]["threadContext"];
        assert_eq!(ctx["filePath"], "/a.tf");
        assert_eq!(ctx["rightFileStart"]["line"], 5);
        assert_eq!(ctx["rightFileEnd"]["line"], 5);
        assert_eq!(ctx["rightFileStart"]["offset"], 1);
        assert_eq!(ctx["rightFileEnd"]["offset"], 1);
    }

    #[tokio::test]
    async fn unusable_line_posts_a_general_comment() {
        let transport = RecordingTransport::answering(200);
        post_issue_thread(&config(), &issue(Some("a.tf"), Some(-1)), &transport)
            .await
            .unwrap();
        assert!(transport.bodies()[0].get("threadContext").is_none());
    }

    #[tokio::test]
    async fn existing_leading_slash_is_preserved() {
        let transport = RecordingTransport::answering(200);
        post_issue_thread(&config(), &issue(Some("/infra/a.tf"), Some(1)), &transport)
            .await
            .unwrap();
        assert_eq!(transport.bodies()[0]["threadContext"]["filePath"], "/infra/a.tf");
    }

    #[tokio::test]
    async fn sends_basic_auth_to_threads_url() {
        let transport = RecordingTransport::answering(200);
        post_issue_thread(&config(), &issue(None, None), &transport)
            .await
            .unwrap();

        let requests = transport.requests.lock().unwrap();
        let (url, auth, _) = &requests[0];
        assert!(url.ends_with("/pullRequests/42/threads?api-version=7.1"));
        assert_eq!(auth, &basic_auth_header("secret-token"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error_with_truncated_body() {
        let transport = RecordingTransport {
            response_body: "x".repeat(500),
            ..RecordingTransport::answering(403)
        };
        let err = post_issue_thread(&config(), &issue(None, None), &transport)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("403"));
        match err {
            ReviewError::ApiStatus { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body.len(), 200);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
