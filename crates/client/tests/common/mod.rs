//! In-process mock backend for end-to-end client tests.
//!
//! Serves the subset of the Pixora API the client consumes, with a
//! scriptable job-status sequence and a togglable quota rejection, so
//! tests can drive the real reqwest client through realistic
//! scenarios without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

/// The access token the mock issues and accepts.
pub const MOCK_TOKEN: &str = "mock-access-token";

/// One scripted answer for `GET /api/jobs/{id}`.
pub enum JobTick {
    /// 200 with this body.
    Ok(serde_json::Value),
    /// 401, as if the credential expired between polls.
    Unauthorized,
}

/// Shared, mutable mock state.
pub struct BackendState {
    /// Successive job-status responses, consumed front to back. When
    /// exhausted, the endpoint answers `processing`.
    pub job_script: Mutex<VecDeque<JobTick>>,
    /// When set, generate endpoints reject with 429 `quota exceeded`.
    pub quota_exceeded: Mutex<bool>,
    /// Body served by the limits endpoint.
    pub limits_body: Mutex<serde_json::Value>,
    /// Jobs actually created by the generate endpoints.
    pub jobs_created: AtomicUsize,
    /// Status fetches served.
    pub polls_served: AtomicUsize,
}

impl BackendState {
    fn new() -> Self {
        Self {
            job_script: Mutex::new(VecDeque::new()),
            quota_exceeded: Mutex::new(false),
            limits_body: Mutex::new(json!({
                "plan_id": "basic",
                "limits": {"total": 5, "image": 3, "video": -1},
                "active_counts": {"total": 2, "image": 2, "video": 0},
                "pending_counts": {"total": 1, "image": 1, "video": 0},
            })),
            jobs_created: AtomicUsize::new(0),
            polls_served: AtomicUsize::new(0),
        }
    }

    /// Queue job-status answers for the next polls.
    pub fn script_job(&self, ticks: impl IntoIterator<Item = JobTick>) {
        self.job_script
            .lock()
            .expect("script lock")
            .extend(ticks);
    }

    pub fn set_quota_exceeded(&self, exceeded: bool) {
        *self.quota_exceeded.lock().expect("quota lock") = exceeded;
    }
}

/// A running mock backend.
pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<BackendState>,
}

/// Bind a mock backend on an ephemeral port and serve it in the
/// background for the duration of the test.
pub async fn spawn_backend() -> MockBackend {
    let state = Arc::new(BackendState::new());

    let app = Router::new()
        .route("/auth/me", get(me))
        .route("/auth/google/callback", post(oauth_callback))
        .route("/api/generate/t2i", post(generate))
        .route("/api/generate/t2v", post(generate))
        .route("/api/jobs/{id}", get(job_status))
        .route("/api/users/me/limits", get(limits))
        .route("/api/users/me/jobs", get(job_history))
        .route("/users/me/transactions", get(transactions))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock backend");
    });

    MockBackend {
        base_url: format!("http://{addr}"),
        state,
    }
}

/// 401 unless the request carries the mock bearer token.
fn authorized(headers: &HeaderMap) -> Result<(), Response> {
    let ok = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {MOCK_TOKEN}"));
    if ok {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "invalid or expired token"})),
        )
            .into_response())
    }
}

async fn me(headers: HeaderMap) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    Json(json!({
        "id": "user-1",
        "email": "fox@example.com",
        "plan_id": "basic",
        "credits": 120,
    }))
    .into_response()
}

async fn oauth_callback(
    axum::extract::Query(params): axum::extract::Query<std::collections::HashMap<String, String>>,
) -> Response {
    match params.get("code").map(String::as_str) {
        Some("good-code") => Json(json!({"access_token": MOCK_TOKEN})).into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "invalid authorization code"})),
        )
            .into_response(),
    }
}

async fn generate(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    if *state.quota_exceeded.lock().expect("quota lock") {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"detail": "quota exceeded"})),
        )
            .into_response();
    }
    state.jobs_created.fetch_add(1, Ordering::SeqCst);
    Json(json!({"job_id": "j1", "status": "pending"})).into_response()
}

async fn job_status(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    state.polls_served.fetch_add(1, Ordering::SeqCst);

    let tick = state.job_script.lock().expect("script lock").pop_front();
    match tick {
        Some(JobTick::Ok(mut body)) => {
            if let Some(obj) = body.as_object_mut() {
                obj.entry("job_id").or_insert(json!(id));
            }
            Json(body).into_response()
        }
        Some(JobTick::Unauthorized) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "token expired"})),
        )
            .into_response(),
        None => Json(json!({"job_id": id, "status": "processing"})).into_response(),
    }
}

async fn limits(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    Json(state.limits_body.lock().expect("limits lock").clone()).into_response()
}

async fn job_history(headers: HeaderMap) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    Json(json!({
        "items": [
            {"job_id": "j1", "job_type": "t2i", "status": "completed",
             "image_url": "https://x/img.png"},
            {"job_id": "j0", "job_type": "t2v", "status": "failed"},
        ],
        "total": 2,
        "page": 1,
        "limit": 20,
        "pages": 1,
    }))
    .into_response()
}

async fn transactions(headers: HeaderMap) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    Json(json!({
        "items": [
            {"id": "tx2", "amount": -4, "type": "generation"},
            {"id": "tx1", "amount": 100, "type": "purchase"},
        ],
        "total": 2,
        "page": 1,
        "limit": 20,
        "pages": 1,
    }))
    .into_response()
}
