use chrono::{DateTime, NaiveDate, Utc};
use sleeplog_core::{
    compose_for, format_record, is_duplicate, DailyRecord, DataSource, MatchMode, LOOKBACK,
};

use super::{ensure_issue, publish, validate_issue, FitnessSource, IssueTracker, Outcome};
use crate::error::Error;

/// A validated sleep-sync invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub issue: u64,
    /// Day to fetch from the fitness API.
    pub date: NaiveDate,
    pub dry_run: bool,
}

impl SyncRequest {
    /// `date` is an ISO `YYYY-MM-DD` string; `today` is used when it is absent.
    pub fn new(
        issue: u64,
        date: Option<&str>,
        today: NaiveDate,
        dry_run: bool,
    ) -> Result<Self, Error> {
        let issue = validate_issue(issue)?;
        let date = match date {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                Error::invalid("--date", format!("{:?} is not a YYYY-MM-DD date", raw))
            })?,
            None => today,
        };

        Ok(Self {
            issue,
            date,
            dry_run,
        })
    }
}

/// Fetch one day of sleep data and post it, at most once per calendar day.
pub async fn run_sync<T: IssueTracker, F: FitnessSource>(
    tracker: &T,
    fitness: &F,
    request: &SyncRequest,
    now: DateTime<Utc>,
) -> Result<Outcome, Error> {
    let issue = ensure_issue(tracker, request.issue).await?;

    tracing::info!("Fetching sleep data for {}", request.date);
    let record = match fitness.fetch_daily_record(request.date).await? {
        Some(raw) => DailyRecord::from_utc(request.date, raw.sleep_start, raw.sleep_end),
        None => DailyRecord::new(request.date, None, None),
    };
    if record.is_empty() {
        tracing::warn!("No sleep data available for {}", request.date);
        return Ok(Outcome::NoData { date: request.date });
    }

    let line = format_record(&record);
    tracing::info!("Formatted entry: {}", line);

    let recent = tracker.list_recent_comments(&issue, LOOKBACK).await?;
    if is_duplicate(&line, &recent, MatchMode::SameDate) {
        tracing::info!(
            "Entry for {} already on issue #{}, skipping",
            record.date,
            request.issue
        );
        return Ok(Outcome::Duplicate {
            issue: request.issue,
        });
    }

    let body = compose_for(&line, DataSource::Garmin, now);
    publish(tracker, request.issue, body, request.dry_run).await
}
