//! Garmin Connect client for daily sleep data.
//!
//! Authenticates with an OAuth2 bearer token and reads two endpoints:
//! the social profile (for the account's display name) and the daily sleep
//! summary keyed by that name.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sleeplog_core::to_local;
use thiserror::Error;

use super::retry::{with_retry, RetryPolicy, Transient};
use super::USER_AGENT;
use crate::config::GarminConfig;

/// Garmin Connect client errors.
#[derive(Debug, Error)]
pub enum GarminError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: access token missing or expired")]
    Unauthorized,

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected response: {0}")]
    Server(String),
}

impl Transient for GarminError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::RateLimited(_) | Self::Unavailable(_) => true,
            _ => false,
        }
    }
}

/// Raw sleep window for one night, as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSleep {
    pub sleep_start: Option<DateTime<Utc>>,
    pub sleep_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SocialProfile {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct DailySleepResponse {
    #[serde(rename = "dailySleepDTO", default)]
    daily_sleep_dto: Option<DailySleepDto>,
}

#[derive(Debug, Deserialize)]
struct DailySleepDto {
    #[serde(rename = "sleepStartTimestampGMT", default)]
    sleep_start_timestamp_gmt: Option<i64>,
    #[serde(rename = "sleepEndTimestampGMT", default)]
    sleep_end_timestamp_gmt: Option<i64>,
}

/// Garmin Connect API client.
#[derive(Debug, Clone)]
pub struct GarminClient {
    base_url: String,
    access_token: String,
    client: Client,
    retry: RetryPolicy,
}

impl GarminClient {
    pub fn new(config: &GarminConfig) -> Result<Self, GarminError> {
        if !config.ssl_verify {
            tracing::warn!("TLS certificate verification disabled for {}", config.domain);
        }
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(!config.ssl_verify)
            .build()?;

        tracing::info!("Configured Garmin Connect client for {}", config.domain);
        Ok(Self {
            base_url: config.api_url.clone(),
            access_token: config.access_token.clone(),
            client,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// GET `path` with query parameters, retrying transient failures.
    async fn get_json<T: DeserializeOwned>(
        &self,
        what: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GarminError> {
        let url = format!("{}{}", self.base_url, path);
        with_retry(&self.retry, what, || async {
            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(query)
                .send()
                .await?;
            self.handle_response(response).await
        })
        .await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, GarminError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GarminError::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => GarminError::RateLimited(body),
            s if s.is_server_error() => GarminError::Unavailable(format!("{}: {}", s, body)),
            _ => GarminError::Server(format!("{}: {}", status, body)),
        })
    }

    async fn display_name(&self) -> Result<String, GarminError> {
        let profile: SocialProfile = self
            .get_json("Garmin profile lookup", "/userprofile-service/socialProfile", &[])
            .await?;
        Ok(profile.display_name)
    }

    /// Fetch the sleep window recorded for `date`.
    ///
    /// Returns `None` when Garmin has no sleep summary for the day. A summary
    /// may still carry only one of the two timestamps.
    pub async fn fetch_daily_record(
        &self,
        date: NaiveDate,
    ) -> Result<Option<RawSleep>, GarminError> {
        let display_name = self.display_name().await?;
        let date_param = date.format("%Y-%m-%d").to_string();

        let response: DailySleepResponse = self
            .get_json(
                "Garmin sleep fetch",
                &format!("/wellness-service/wellness/dailySleepData/{}", display_name),
                &[("date", date_param.as_str()), ("nonSleepBufferMinutes", "60")],
            )
            .await?;

        let Some(dto) = response.daily_sleep_dto else {
            tracing::warn!("Empty daily sleep summary for {}", date);
            return Ok(None);
        };

        tracing::debug!(
            "Raw GMT timestamps - sleep_start_ms={:?}, sleep_end_ms={:?}",
            dto.sleep_start_timestamp_gmt,
            dto.sleep_end_timestamp_gmt
        );

        let sleep = RawSleep {
            sleep_start: from_millis(dto.sleep_start_timestamp_gmt),
            sleep_end: from_millis(dto.sleep_end_timestamp_gmt),
        };
        tracing::info!(
            "Retrieved sleep data for {}: sleep={:?}, wake={:?}",
            date,
            sleep.sleep_start,
            sleep.sleep_end
        );
        Ok(Some(sleep))
    }
}

/// Garmin reports missing timestamps as null or zero. Values that do not
/// fit a UTC+8 wall clock are dropped as well.
fn from_millis(ms: Option<i64>) -> Option<DateTime<Utc>> {
    let ms = ms.filter(|ms| *ms > 0)?;
    let at = DateTime::<Utc>::from_timestamp_millis(ms).filter(|at| to_local(*at).is_some());
    if at.is_none() {
        tracing::warn!("Ignoring out-of-range Garmin timestamp: {}", ms);
    }
    at
}
