use chrono::{DateTime, Utc};
use sleeplog_core::{compose_for, is_duplicate, DataSource, MatchMode, LOOKBACK};

use super::{ensure_issue, publish, validate_issue, IssueTracker, Outcome};
use crate::error::Error;

/// A validated quick-note invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRequest {
    pub issue: u64,
    /// The comment text before the footer.
    pub payload: String,
    pub dry_run: bool,
}

impl NoteRequest {
    /// Trims the note and rejects it if nothing is left. When `age` is given
    /// it is appended as ` - <age>`.
    pub fn new(issue: u64, note: &str, age: Option<&str>, dry_run: bool) -> Result<Self, Error> {
        let issue = validate_issue(issue)?;
        let note = note.trim();
        if note.is_empty() {
            return Err(Error::invalid("note", "note content cannot be empty"));
        }

        let payload = match age {
            Some(age) => format!("{} - {}", note, age),
            None => note.to_string(),
        };

        Ok(Self {
            issue,
            payload,
            dry_run,
        })
    }
}

/// Post a quick note unless an identical one is among the recent comments.
pub async fn run_note<T: IssueTracker>(
    tracker: &T,
    request: &NoteRequest,
    now: DateTime<Utc>,
) -> Result<Outcome, Error> {
    tracing::info!("Preparing to post note to issue #{}", request.issue);
    let issue = ensure_issue(tracker, request.issue).await?;

    let recent = tracker.list_recent_comments(&issue, LOOKBACK).await?;
    if is_duplicate(&request.payload, &recent, MatchMode::Exact) {
        tracing::info!("Skipped posting duplicate note to issue #{}", request.issue);
        return Ok(Outcome::Duplicate {
            issue: request.issue,
        });
    }

    let body = compose_for(&request.payload, DataSource::QuickNote, now);
    publish(tracker, request.issue, body, request.dry_run).await
}
