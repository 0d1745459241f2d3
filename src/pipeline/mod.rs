//! The two posting pipelines.
//!
//! Both run the same sequence: confirm the issue exists, build the payload,
//! compare it against the issue's recent comments, then post it (or print
//! it, on a dry run). Input validation happens before either pipeline is
//! entered, so a pipeline never starts without its credentials.

mod note;
mod sync;

pub use note::*;
pub use sync::*;

use chrono::NaiveDate;

use crate::clients::{
    CommentRef, GarminClient, GarminError, GitHubClient, GitHubError, Issue, RawSleep,
};
use crate::error::Error;
use crate::repo::Repository;

/// The issue tracker as the pipelines see it.
#[allow(async_fn_in_trait)]
pub trait IssueTracker {
    fn repository(&self) -> &Repository;

    /// `None` when the issue does not exist.
    async fn find_issue(&self, issue: u64) -> Result<Option<Issue>, GitHubError>;

    /// Up to `limit` comment bodies, most recent first.
    async fn list_recent_comments(
        &self,
        issue: &Issue,
        limit: usize,
    ) -> Result<Vec<String>, GitHubError>;

    async fn create_comment(&self, issue: u64, body: &str) -> Result<CommentRef, GitHubError>;
}

impl IssueTracker for GitHubClient {
    fn repository(&self) -> &Repository {
        GitHubClient::repository(self)
    }

    async fn find_issue(&self, issue: u64) -> Result<Option<Issue>, GitHubError> {
        GitHubClient::find_issue(self, issue).await
    }

    async fn list_recent_comments(
        &self,
        issue: &Issue,
        limit: usize,
    ) -> Result<Vec<String>, GitHubError> {
        GitHubClient::list_recent_comments(self, issue, limit).await
    }

    async fn create_comment(&self, issue: u64, body: &str) -> Result<CommentRef, GitHubError> {
        GitHubClient::create_comment(self, issue, body).await
    }
}

/// Where sleep data comes from.
#[allow(async_fn_in_trait)]
pub trait FitnessSource {
    async fn fetch_daily_record(&self, date: NaiveDate) -> Result<Option<RawSleep>, GarminError>;
}

impl FitnessSource for GarminClient {
    async fn fetch_daily_record(&self, date: NaiveDate) -> Result<Option<RawSleep>, GarminError> {
        GarminClient::fetch_daily_record(self, date).await
    }
}

/// How a successful invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Posted { issue: u64, comment: CommentRef },
    /// The payload was already on the issue; nothing was written.
    Duplicate { issue: u64 },
    /// The fitness API had neither a sleep nor a wake time for the day.
    NoData { date: NaiveDate },
    /// Dry run: the body that would have been posted.
    DryRun { issue: u64, body: String },
}

impl Outcome {
    /// The line printed on stdout for this outcome.
    pub fn summary(&self) -> String {
        match self {
            Self::Posted { issue, comment } => format!(
                "✓ Successfully posted comment to issue #{}: {}",
                issue, comment.html_url
            ),
            Self::Duplicate { issue } => {
                format!("ℹ Comment already exists on issue #{} (skipped)", issue)
            }
            Self::NoData { date } => {
                format!("ℹ No sleep data available for {} (nothing posted)", date)
            }
            Self::DryRun { issue, body } => {
                format!("[DRY RUN] Would post to issue #{}:\n{}", issue, body)
            }
        }
    }
}

fn validate_issue(issue: u64) -> Result<u64, Error> {
    if issue == 0 {
        return Err(Error::invalid("--issue", "issue numbers start at 1"));
    }
    Ok(issue)
}

async fn ensure_issue<T: IssueTracker>(tracker: &T, issue: u64) -> Result<Issue, Error> {
    tracker
        .find_issue(issue)
        .await?
        .ok_or_else(|| Error::IssueNotFound {
            issue,
            repository: tracker.repository().to_string(),
        })
}

/// Final step of both pipelines: post `body`, or hand it back on a dry run.
async fn publish<T: IssueTracker>(
    tracker: &T,
    issue: u64,
    body: String,
    dry_run: bool,
) -> Result<Outcome, Error> {
    if dry_run {
        tracing::info!("DRY RUN MODE - skipping comment creation");
        return Ok(Outcome::DryRun { issue, body });
    }

    tracing::info!("Posting to issue #{}...", issue);
    match tracker.create_comment(issue, &body).await {
        Ok(comment) => Ok(Outcome::Posted { issue, comment }),
        // The issue disappeared between the existence check and the post.
        Err(GitHubError::NotFound(_)) => Err(Error::IssueNotFound {
            issue,
            repository: tracker.repository().to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}
