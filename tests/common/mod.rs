//! In-process stand-ins for the GitHub and Garmin Connect APIs.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

pub const TOKEN: &str = "test-token";

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock server failed");
    });
    format!("http://{}", addr)
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

/// A canned error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The status with a generic body. A 403 here is a plain permission error.
    Status(u16),
    /// 403 with `x-ratelimit-remaining: 0` and a body that does not mention limits.
    QuotaExhausted,
    /// 403 whose body reports a secondary rate limit, without quota headers.
    SecondaryRateLimit,
}

fn failure(status: u16) -> Response {
    respond(Failure::Status(status))
}

fn respond(kind: Failure) -> Response {
    match kind {
        Failure::Status(status) => {
            let status =
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let message = match status {
                StatusCode::TOO_MANY_REQUESTS => "API rate limit exceeded",
                StatusCode::FORBIDDEN => "Resource not accessible by integration",
                _ => "mock failure",
            };
            (status, Json(json!({ "message": message }))).into_response()
        }
        Failure::QuotaExhausted => (
            StatusCode::FORBIDDEN,
            [("x-ratelimit-remaining", "0")],
            Json(json!({ "message": "Forbidden" })),
        )
            .into_response(),
        Failure::SecondaryRateLimit => (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "You have exceeded a secondary rate limit." })),
        )
            .into_response(),
    }
}

// ============================================================
// GitHub
// ============================================================

#[derive(Default)]
pub struct GitHubState {
    /// Comment bodies per issue, oldest first.
    pub issues: HashMap<u64, Vec<String>>,
    /// Bodies received through POST, in order.
    pub posted: Vec<(u64, String)>,
    /// Responses returned (one per request) before issue lookups succeed.
    pub issue_failures: VecDeque<Failure>,
    /// Responses returned (one per request) before comment creation succeeds.
    pub post_failures: VecDeque<Failure>,
    pub issue_lookups: usize,
    pub post_attempts: usize,
}

#[derive(Clone, Default)]
pub struct MockGitHub {
    pub state: Arc<Mutex<GitHubState>>,
}

#[derive(Deserialize)]
struct Pagination {
    per_page: usize,
    page: usize,
}

impl MockGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issue(self, number: u64, comments: &[&str]) -> Self {
        self.state
            .lock()
            .unwrap()
            .issues
            .insert(number, comments.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn fail_issue_lookups(self, statuses: &[u16]) -> Self {
        let failures: Vec<Failure> = statuses.iter().map(|s| Failure::Status(*s)).collect();
        self.fail_issue_lookups_with(&failures)
    }

    pub fn fail_issue_lookups_with(self, failures: &[Failure]) -> Self {
        self.state
            .lock()
            .unwrap()
            .issue_failures
            .extend(failures.iter().copied());
        self
    }

    pub fn fail_posts(self, statuses: &[u16]) -> Self {
        let failures: Vec<Failure> = statuses.iter().map(|s| Failure::Status(*s)).collect();
        self.fail_posts_with(&failures)
    }

    pub fn fail_posts_with(self, failures: &[Failure]) -> Self {
        self.state
            .lock()
            .unwrap()
            .post_failures
            .extend(failures.iter().copied());
        self
    }

    pub fn issue_lookups(&self) -> usize {
        self.state.lock().unwrap().issue_lookups
    }

    pub fn posted(&self) -> Vec<(u64, String)> {
        self.state.lock().unwrap().posted.clone()
    }

    pub fn post_attempts(&self) -> usize {
        self.state.lock().unwrap().post_attempts
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/repos/{owner}/{repo}/issues/{number}", get(github_issue))
            .route(
                "/repos/{owner}/{repo}/issues/{number}/comments",
                get(github_comments).post(github_create_comment),
            )
            .with_state(self.clone())
    }

    pub async fn start(&self) -> String {
        spawn(self.router()).await
    }
}

async fn github_issue(
    State(mock): State<MockGitHub>,
    headers: HeaderMap,
    Path((_owner, _repo, number)): Path<(String, String, u64)>,
) -> Response {
    if !authorized(&headers) {
        return failure(401);
    }
    let mut state = mock.state.lock().unwrap();
    state.issue_lookups += 1;
    if let Some(f) = state.issue_failures.pop_front() {
        return respond(f);
    }
    match state.issues.get(&number) {
        Some(comments) => {
            Json(json!({ "number": number, "comments": comments.len() })).into_response()
        }
        None => failure(404),
    }
}

async fn github_comments(
    State(mock): State<MockGitHub>,
    headers: HeaderMap,
    Path((_owner, _repo, number)): Path<(String, String, u64)>,
    Query(page): Query<Pagination>,
) -> Response {
    if !authorized(&headers) {
        return failure(401);
    }
    let state = mock.state.lock().unwrap();
    let Some(comments) = state.issues.get(&number) else {
        return failure(404);
    };

    let start = (page.page.max(1) - 1) * page.per_page;
    let slice: Vec<Value> = comments
        .iter()
        .enumerate()
        .skip(start)
        .take(page.per_page)
        .map(|(i, body)| json!({ "id": i + 1, "body": body }))
        .collect();
    Json(Value::Array(slice)).into_response()
}

async fn github_create_comment(
    State(mock): State<MockGitHub>,
    headers: HeaderMap,
    Path((owner, repo, number)): Path<(String, String, u64)>,
    Json(payload): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return failure(401);
    }
    let mut state = mock.state.lock().unwrap();
    state.post_attempts += 1;
    if let Some(f) = state.post_failures.pop_front() {
        return respond(f);
    }
    let body = payload["body"].as_str().unwrap_or_default().to_string();
    let Some(comments) = state.issues.get_mut(&number) else {
        return failure(404);
    };
    comments.push(body.clone());
    let id = comments.len() as u64 + 1000;
    state.posted.push((number, body));

    (
        StatusCode::CREATED,
        Json(json!({
            "id": id,
            "html_url": format!(
                "https://github.com/{}/{}/issues/{}#issuecomment-{}",
                owner, repo, number, id
            ),
        })),
    )
        .into_response()
}

// ============================================================
// Garmin Connect
// ============================================================

#[derive(Default)]
pub struct GarminState {
    /// `dailySleepDTO` values keyed by `YYYY-MM-DD`.
    pub days: HashMap<String, Value>,
    /// Statuses returned (one per request) before sleep lookups succeed.
    pub sleep_failures: VecDeque<u16>,
    pub sleep_requests: usize,
}

#[derive(Clone, Default)]
pub struct MockGarmin {
    pub state: Arc<Mutex<GarminState>>,
}

#[derive(Deserialize)]
struct SleepQuery {
    date: String,
}

impl MockGarmin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a night with GMT millisecond timestamps.
    pub fn with_night(self, date: &str, start_ms: Option<i64>, end_ms: Option<i64>) -> Self {
        self.state.lock().unwrap().days.insert(
            date.to_string(),
            json!({
                "id": 1,
                "calendarDate": date,
                "sleepStartTimestampGMT": start_ms,
                "sleepEndTimestampGMT": end_ms,
            }),
        );
        self
    }

    pub fn fail_sleep_lookups(self, statuses: &[u16]) -> Self {
        self.state
            .lock()
            .unwrap()
            .sleep_failures
            .extend(statuses.iter().copied());
        self
    }

    pub fn sleep_requests(&self) -> usize {
        self.state.lock().unwrap().sleep_requests
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/userprofile-service/socialProfile", get(garmin_profile))
            .route(
                "/wellness-service/wellness/dailySleepData/{display_name}",
                get(garmin_sleep),
            )
            .with_state(self.clone())
    }

    pub async fn start(&self) -> String {
        spawn(self.router()).await
    }
}

async fn garmin_profile(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return failure(401);
    }
    Json(json!({ "displayName": "sleeper", "userName": "sleeper" })).into_response()
}

async fn garmin_sleep(
    State(mock): State<MockGarmin>,
    headers: HeaderMap,
    Path(display_name): Path<String>,
    Query(query): Query<SleepQuery>,
) -> Response {
    if !authorized(&headers) {
        return failure(401);
    }
    if display_name != "sleeper" {
        return failure(404);
    }
    let mut state = mock.state.lock().unwrap();
    state.sleep_requests += 1;
    if let Some(status) = state.sleep_failures.pop_front() {
        return failure(status);
    }
    let dto = state.days.get(&query.date).cloned().unwrap_or(Value::Null);
    Json(json!({ "dailySleepDTO": dto })).into_response()
}
