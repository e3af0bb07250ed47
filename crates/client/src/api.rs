//! Typed HTTP client for the Pixora backend.
//!
//! Wraps the backend REST API (OAuth code exchange, profile lookup,
//! job submission and status, concurrency limits, history) using
//! [`reqwest`]. Every response is mapped into the closed
//! [`CoreError`] taxonomy:
//!
//! - transport failures become [`CoreError::Network`] and leave the
//!   credential alone;
//! - a 401 clears the credential through [`SessionStore`] and becomes
//!   [`CoreError::Auth`];
//! - any other non-2xx becomes [`CoreError::Server`] carrying the
//!   body's `detail` field verbatim.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use pixora_core::error::{CoreError, CoreResult};
use pixora_core::history::{CreditTransaction, JobRecord, Page};
use pixora_core::job::{JobKind, JobStatus};
use pixora_core::limits::{CategoryCounts, ConcurrencyLimits};
use pixora_core::types::{JobId, Timestamp};

use crate::session::SessionStore;

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// Profile body returned by `GET /auth/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub credits: Option<i64>,
}

/// Body returned by the OAuth code exchange.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Body returned by the generate endpoints after queuing a job.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    /// Server-issued job identifier.
    pub job_id: JobId,
    pub status: JobStatus,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

/// Body returned by `GET /api/jobs/{id}`.
#[derive(Debug, Deserialize)]
pub struct JobStatusResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// Wire shape of `GET /api/users/me/limits`: three parallel
/// per-category maps.
#[derive(Debug, Deserialize)]
struct LimitsResponse {
    plan_id: String,
    limits: CategoryMap<i64>,
    active_counts: CategoryMap<u32>,
    pending_counts: CategoryMap<u32>,
}

#[derive(Debug, Deserialize)]
struct CategoryMap<T> {
    total: T,
    image: T,
    video: T,
}

impl From<LimitsResponse> for ConcurrencyLimits {
    fn from(raw: LimitsResponse) -> Self {
        let counts = |limit, active, pending| CategoryCounts {
            limit,
            active,
            pending,
        };
        ConcurrencyLimits {
            plan_id: raw.plan_id,
            total: counts(
                raw.limits.total,
                raw.active_counts.total,
                raw.pending_counts.total,
            ),
            image: counts(
                raw.limits.image,
                raw.active_counts.image,
                raw.pending_counts.image,
            ),
            video: counts(
                raw.limits.video,
                raw.active_counts.video,
                raw.pending_counts.video,
            ),
        }
    }
}

/// Error body shape used by the backend for every failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// HTTP client for one backend, sharing a [`SessionStore`] for auth.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            session,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (connection pooling across components).
    pub fn with_http(
        http: reqwest::Client,
        base_url: impl Into<String>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            session,
        }
    }

    /// The session store this client authenticates through.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    // ---- auth ----

    /// Exchange an OAuth authorization code for a credential and store
    /// it in the session.
    ///
    /// `POST /auth/google/callback?code=&mode=api`
    pub async fn exchange_oauth_code(&self, code: &str) -> CoreResult<String> {
        let response = self
            .http
            .post(format!("{}/auth/google/callback", self.base_url))
            .query(&[("code", code), ("mode", "api")])
            .send()
            .await;

        let token: TokenResponse = self.handle(response).await?;
        self.session.set_credential(&token.access_token)?;
        Ok(token.access_token)
    }

    /// Resolve the current session's user profile.
    ///
    /// `GET /auth/me` -- any non-200 means the credential is invalid or
    /// expired.
    pub async fn me(&self) -> CoreResult<UserProfile> {
        let response = self.authed(Method::GET, "/auth/me").send().await;
        self.handle(response).await
    }

    // ---- generation ----

    /// Submit a generation request body to the endpoint for `kind`.
    ///
    /// `POST /api/generate/t2i` or `POST /api/generate/t2v`.
    pub async fn submit_generation(
        &self,
        kind: JobKind,
        body: &serde_json::Value,
    ) -> CoreResult<GenerateResponse> {
        let response = self
            .authed(Method::POST, kind.endpoint_path())
            .json(body)
            .send()
            .await;
        self.handle(response).await
    }

    /// Fetch the current status of a job.
    ///
    /// `GET /api/jobs/{id}`
    pub async fn job_status(&self, job_id: &str) -> CoreResult<JobStatusResponse> {
        let response = self
            .authed(Method::GET, &format!("/api/jobs/{job_id}"))
            .send()
            .await;
        self.handle(response).await
    }

    // ---- account ----

    /// Fetch the account's concurrency snapshot.
    ///
    /// `GET /api/users/me/limits`
    pub async fn limits(&self) -> CoreResult<ConcurrencyLimits> {
        let response = self
            .authed(Method::GET, "/api/users/me/limits")
            .send()
            .await;
        let raw: LimitsResponse = self.handle(response).await?;
        Ok(raw.into())
    }

    /// List the account's job history, newest first.
    ///
    /// `GET /api/users/me/jobs?page=&limit=&status=`
    pub async fn jobs(
        &self,
        page: u32,
        limit: u32,
        status: Option<JobStatus>,
    ) -> CoreResult<Page<JobRecord>> {
        let mut request = self
            .authed(Method::GET, "/api/users/me/jobs")
            .query(&[("page", page), ("limit", limit)]);
        if let Some(status) = status {
            request = request.query(&[("status", status.to_string())]);
        }
        self.handle(request.send().await).await
    }

    /// List the account's credit transactions.
    ///
    /// `GET /users/me/transactions?page=&limit=&type=`
    pub async fn transactions(
        &self,
        page: u32,
        limit: u32,
        tx_type: Option<&str>,
    ) -> CoreResult<Page<CreditTransaction>> {
        let mut request = self
            .authed(Method::GET, "/users/me/transactions")
            .query(&[("page", page), ("limit", limit)]);
        if let Some(tx_type) = tx_type {
            request = request.query(&[("type", tx_type)]);
        }
        self.handle(request.send().await).await
    }

    // ---- private helpers ----

    /// Build a request with the `Authorization` header when a
    /// credential is present.
    fn authed(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .request(method, format!("{}{path}", self.base_url));
        if let Some(bearer) = self.session.bearer() {
            request = request.header("Authorization", bearer);
        }
        request
    }

    /// Map a raw response into the error taxonomy and parse the body.
    ///
    /// A 401 clears the credential (the server has pronounced it
    /// dead); transport errors do not.
    async fn handle<T: DeserializeOwned>(
        &self,
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> CoreResult<T> {
        let response = response.map_err(|e| CoreError::Network(e.to_string()))?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.session.clear_credential();
            return Err(CoreError::Auth(
                "credential rejected by the server".to_string(),
            ));
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let detail = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(parsed) => parsed.detail,
                Err(_) => body,
            };
            return Err(CoreError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CoreError::Network(format!("decoding response body: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
