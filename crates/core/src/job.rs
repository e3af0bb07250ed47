//! Generation job kinds, the status state machine, and the [`Job`]
//! lifecycle record.
//!
//! Status transitions are monotonic forward through
//! `pending → processing → completed | failed`. The first observation
//! of a job may already be terminal (`pending → completed` directly is
//! legal); `completed` and `failed` are absorbing and mutually
//! unreachable.

use serde::{Deserialize, Serialize};

use crate::types::JobId;

// ---------------------------------------------------------------------------
// JobKind
// ---------------------------------------------------------------------------

/// The fixed set of generation request kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobKind {
    /// Text → image.
    #[serde(rename = "t2i")]
    TextToImage,
    /// Image → image (requires a source image).
    #[serde(rename = "i2i")]
    ImageToImage,
    /// Text → video.
    #[serde(rename = "t2v")]
    TextToVideo,
    /// Image → video (requires a source image).
    #[serde(rename = "i2v")]
    ImageToVideo,
}

impl JobKind {
    /// Whether this kind produces a video (as opposed to an image).
    pub fn is_video(&self) -> bool {
        matches!(self, JobKind::TextToVideo | JobKind::ImageToVideo)
    }

    /// Whether this kind is conditioned on a source image.
    pub fn requires_source_image(&self) -> bool {
        matches!(self, JobKind::ImageToImage | JobKind::ImageToVideo)
    }

    /// The generate endpoint path for this kind. Image-conditioned
    /// kinds share the endpoint of their text-conditioned counterpart
    /// and pass the source image as a body parameter.
    pub fn endpoint_path(&self) -> &'static str {
        if self.is_video() {
            "/api/generate/t2v"
        } else {
            "/api/generate/t2i"
        }
    }

    /// Wire name, e.g. `"t2i"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::TextToImage => "t2i",
            JobKind::ImageToImage => "i2i",
            JobKind::TextToVideo => "t2v",
            JobKind::ImageToVideo => "i2v",
        }
    }

    /// Parse a wire name back into a kind.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "t2i" => Some(JobKind::TextToImage),
            "i2i" => Some(JobKind::ImageToImage),
            "t2v" => Some(JobKind::TextToVideo),
            "i2v" => Some(JobKind::ImageToVideo),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a generation job as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, waiting for a worker.
    Pending,
    /// A worker is executing the job.
    Processing,
    /// Finished successfully; a result reference is available.
    Completed,
    /// Finished unsuccessfully.
    Failed,
}

impl JobStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Position in the forward enumeration order. Both terminal states
    /// share the highest rank so neither is reachable from the other.
    fn rank(&self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Processing => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }

    /// Whether a transition from `self` to `next` is legal.
    ///
    /// Legal transitions move strictly forward in rank; observing the
    /// same status again is not a transition. `pending → completed` is
    /// legal because the first poll may already see a terminal state.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// A single generation request and its lifecycle record.
///
/// Created when submission succeeds, mutated only by the poller that
/// owns it, and handed to the caller read-only once terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Server-issued identifier.
    pub id: JobId,
    /// What is being generated.
    pub kind: JobKind,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Result reference (image or video URL) once completed.
    pub result_url: Option<String>,
    /// Failure message once failed.
    pub error: Option<String>,
    /// Estimated cost in credits, from the model registry.
    pub cost_estimate: u32,
}

impl Job {
    /// Build a freshly-submitted job record.
    pub fn new(id: JobId, kind: JobKind, status: JobStatus, cost_estimate: u32) -> Self {
        Self {
            id,
            kind,
            status,
            result_url: None,
            error: None,
            cost_estimate,
        }
    }

    /// Apply an observed status, enforcing forward monotonicity.
    ///
    /// Returns `true` if the status changed. Re-observing the current
    /// status or observing a backwards move leaves the job untouched.
    pub fn observe_status(&mut self, next: JobStatus) -> bool {
        if self.status.can_transition_to(next) {
            self.status = next;
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
