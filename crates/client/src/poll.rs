//! Job status polling state machine.
//!
//! A [`JobPoller`] owns one submitted job and drives it to a terminal
//! state by fetching its status at a fixed interval. The loop is
//! strictly sequential: the next fetch is scheduled only after the
//! current one resolves, so there is never more than one in-flight
//! status request per tracked job, even on a slow network.
//!
//! Cancellation is cooperative, carried by a
//! [`CancellationToken`]: the token is checked both before issuing a
//! fetch and before scheduling the next tick, so a cancelled poller
//! performs at most one more in-flight request and never leaks a
//! timer. Distinct pollers are independent; no cross-job ordering is
//! guaranteed or needed.
//!
//! A tick-level failure does not mean the job failed. Losing the
//! ability to observe the job ends the poll with
//! [`PollOutcome::Lost`]; the caller should start a fresh poller
//! rather than report a job failure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use pixora_core::error::{CoreError, CoreResult};
use pixora_core::job::{Job, JobStatus};
use pixora_core::types::JobId;

use crate::api::ApiClient;

/// Default delay between status fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

// ---------------------------------------------------------------------------
// Status source
// ---------------------------------------------------------------------------

/// One observed status tick for a job.
#[derive(Debug, Clone)]
pub struct JobStatusUpdate {
    pub status: JobStatus,
    /// Result reference, present once the backend has one.
    pub result_url: Option<String>,
    /// Failure message, present when the backend reports failure.
    pub error: Option<String>,
}

/// Where the poller reads job status from.
///
/// The production implementation is [`ApiClient`]; tests inject fakes
/// with scripted sequences and deliberate delays.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn fetch_status(&self, job_id: &JobId) -> CoreResult<JobStatusUpdate>;
}

#[async_trait]
impl JobStatusSource for ApiClient {
    async fn fetch_status(&self, job_id: &JobId) -> CoreResult<JobStatusUpdate> {
        let response = self.job_status(job_id).await?;
        Ok(JobStatusUpdate {
            status: response.status,
            result_url: response.image_url.or(response.video_url),
            error: response.error,
        })
    }
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// How a poll run ended.
#[derive(Debug)]
pub enum PollOutcome {
    /// The job completed; `job.result_url` holds the result reference.
    Completed(Job),
    /// The backend reported the job as failed; `job.error` says why.
    Failed(Job),
    /// The credential was rejected mid-poll. It has already been
    /// cleared; an authentication flow must be re-entered.
    AuthRequired(Job),
    /// The poller lost the ability to observe the job. The job itself
    /// has not failed; retry with a fresh poller.
    Lost {
        job: Job,
        error: CoreError,
    },
    /// The caller cancelled the poll before a terminal state.
    Cancelled(Job),
}

/// Drives one job through its state machine to a terminal state.
pub struct JobPoller {
    source: Arc<dyn JobStatusSource>,
    interval: Duration,
    cancel: CancellationToken,
}

impl JobPoller {
    /// Poller reading from `source` at the given interval.
    pub fn new(source: Arc<dyn JobStatusSource>, interval: Duration) -> Self {
        Self {
            source,
            interval,
            cancel: CancellationToken::new(),
        }
    }

    /// Poller with the default 2-second interval.
    pub fn with_default_interval(source: Arc<dyn JobStatusSource>) -> Self {
        Self::new(source, DEFAULT_POLL_INTERVAL)
    }

    /// A handle the caller can keep to cancel the poll from elsewhere
    /// (e.g. on view teardown).
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cooperative cancellation. At most one in-flight fetch
    /// may still complete; its result is discarded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Poll `job` until terminal, cancelled, or unobservable.
    ///
    /// Takes ownership of the job record and returns it inside the
    /// outcome, updated with everything observed along the way.
    pub async fn run(&self, mut job: Job) -> PollOutcome {
        loop {
            // Checkpoint one: before issuing a fetch.
            if self.cancel.is_cancelled() {
                tracing::debug!(job_id = %job.id, "Poll cancelled before fetch");
                return PollOutcome::Cancelled(job);
            }

            match self.source.fetch_status(&job.id).await {
                Ok(update) => {
                    if job.observe_status(update.status) {
                        tracing::debug!(
                            job_id = %job.id,
                            status = %job.status,
                            "Job status advanced",
                        );
                    }
                    if let Some(url) = update.result_url {
                        job.result_url = Some(url);
                    }

                    match job.status {
                        JobStatus::Completed => {
                            tracing::info!(job_id = %job.id, "Job completed");
                            return PollOutcome::Completed(job);
                        }
                        JobStatus::Failed => {
                            job.error = update
                                .error
                                .or_else(|| Some("job failed".to_string()));
                            tracing::warn!(
                                job_id = %job.id,
                                error = job.error.as_deref().unwrap_or(""),
                                "Job failed",
                            );
                            return PollOutcome::Failed(job);
                        }
                        JobStatus::Pending | JobStatus::Processing => {}
                    }
                }
                Err(CoreError::Auth(msg)) => {
                    // The credential was already cleared by the client.
                    tracing::warn!(job_id = %job.id, error = %msg, "Poll hit auth failure");
                    return PollOutcome::AuthRequired(job);
                }
                Err(other) => {
                    tracing::warn!(
                        job_id = %job.id,
                        error = %other,
                        "Lost observation of job",
                    );
                    let error = CoreError::Observation(other.to_string());
                    return PollOutcome::Lost { job, error };
                }
            }

            // Checkpoint two: before scheduling the next tick. The
            // sleep itself races the token so cancellation never waits
            // out a full interval.
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::debug!(job_id = %job.id, "Poll cancelled during wait");
                    return PollOutcome::Cancelled(job);
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
