//! GitHub REST client for issue comments.

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::retry::{with_retry, RetryPolicy, Transient};
use super::USER_AGENT;
use crate::config::GitHubConfig;
use crate::repo::Repository;

/// GitHub caps `per_page` at 100.
const MAX_PER_PAGE: usize = 100;

/// GitHub client errors.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: GitHub token missing or invalid")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl Transient for GitHubError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect(),
            Self::RateLimited(_) | Self::Unavailable(_) => true,
            _ => false,
        }
    }
}

/// A comment created by [`GitHubClient::create_comment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRef {
    pub id: u64,
    pub html_url: String,
}

/// The parts of an issue the pipelines need.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    pub number: u64,
    /// Number of comments on the issue.
    pub comments: u64,
}

#[derive(Debug, Deserialize)]
struct IssueComment {
    #[serde(default)]
    body: Option<String>,
}

/// GitHub client scoped to one repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    base_url: String,
    token: String,
    repository: Repository,
    client: Client,
    retry: RetryPolicy,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig, repository: Repository) -> Result<Self, GitHubError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            base_url: config.api_url.clone(),
            token: config.token.clone(),
            repository,
            client,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Build a request against `/repos/{owner}/{name}{path}`.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/repos/{}/{}{}",
            self.base_url, self.repository.owner, self.repository.name, path
        );
        self.client
            .request(method, &url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Handle response, converting HTTP errors to GitHubError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, GitHubError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let exhausted = response
            .headers()
            .get("x-ratelimit-remaining")
            .is_some_and(|v| v.as_bytes() == b"0");
        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED => GitHubError::Unauthorized,
            StatusCode::NOT_FOUND => GitHubError::NotFound(body),
            StatusCode::TOO_MANY_REQUESTS => GitHubError::RateLimited(body),
            StatusCode::FORBIDDEN if exhausted || body.contains("rate limit") => {
                GitHubError::RateLimited(body)
            }
            StatusCode::FORBIDDEN => GitHubError::Forbidden(body),
            s if s.is_server_error() => GitHubError::Unavailable(format!("{}: {}", s, body)),
            _ => GitHubError::Server(format!("{}: {}", status, body)),
        })
    }

    async fn get_issue(&self, number: u64) -> Result<Issue, GitHubError> {
        with_retry(&self.retry, "GitHub issue lookup", || async {
            let response = self
                .request(Method::GET, &format!("/issues/{}", number))
                .send()
                .await?;
            self.handle_response(response).await
        })
        .await
    }

    async fn comments_page(
        &self,
        number: u64,
        per_page: usize,
        page: u64,
    ) -> Result<Vec<String>, GitHubError> {
        let comments: Vec<IssueComment> =
            with_retry(&self.retry, "GitHub comment listing", || async {
                let response = self
                    .request(Method::GET, &format!("/issues/{}/comments", number))
                    .query(&[("per_page", per_page as u64), ("page", page)])
                    .send()
                    .await?;
                self.handle_response(response).await
            })
            .await?;

        Ok(comments
            .into_iter()
            .map(|c| c.body.unwrap_or_default())
            .collect())
    }

    /// Look up an issue; `None` when it does not exist or is not visible
    /// to the configured token.
    pub async fn find_issue(&self, number: u64) -> Result<Option<Issue>, GitHubError> {
        match self.get_issue(number).await {
            Ok(issue) => {
                tracing::info!(
                    "Issue #{} exists and is accessible ({} comments)",
                    number,
                    issue.comments
                );
                Ok(Some(issue))
            }
            Err(GitHubError::NotFound(_)) => {
                tracing::warn!("Issue #{} not found in {}", number, self.repository);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Check whether an issue exists and is readable with the configured token.
    pub async fn issue_exists(&self, number: u64) -> Result<bool, GitHubError> {
        Ok(self.find_issue(number).await?.is_some())
    }

    /// Bodies of the last `limit` comments on an issue, most recent first.
    ///
    /// GitHub lists issue comments oldest first, so this uses the comment
    /// count from [`find_issue`](Self::find_issue) and fetches the trailing
    /// page (plus the one before it when the trailing page is short).
    pub async fn list_recent_comments(
        &self,
        issue: &Issue,
        limit: usize,
    ) -> Result<Vec<String>, GitHubError> {
        let number = issue.number;
        let total = issue.comments;
        if limit == 0 || total == 0 {
            return Ok(Vec::new());
        }

        let per_page = limit.min(MAX_PER_PAGE);
        let last_page = total.div_ceil(per_page as u64);

        let mut bodies = self.comments_page(number, per_page, last_page).await?;
        if bodies.len() < per_page && last_page > 1 {
            let mut earlier = self.comments_page(number, per_page, last_page - 1).await?;
            earlier.append(&mut bodies);
            bodies = earlier;
        }

        bodies.reverse();
        bodies.truncate(limit);
        tracing::debug!("Fetched {} recent comments on issue #{}", bodies.len(), number);
        Ok(bodies)
    }

    /// Post a new comment on an issue.
    pub async fn create_comment(
        &self,
        number: u64,
        body: &str,
    ) -> Result<CommentRef, GitHubError> {
        let comment: CommentRef = with_retry(&self.retry, "GitHub comment creation", || async {
            let response = self
                .request(Method::POST, &format!("/issues/{}/comments", number))
                .json(&serde_json::json!({ "body": body }))
                .send()
                .await?;
            self.handle_response(response).await
        })
        .await?;

        tracing::info!("Created comment {} on issue #{}", comment.id, number);
        Ok(comment)
    }
}
