//! Client-side error taxonomy.
//!
//! Every fallible operation in the client stack reports through
//! [`CoreError`], so callers can exhaustively match instead of probing
//! optional fields on loosely-typed responses. The variants map to
//! distinct recovery strategies:
//!
//! - [`Validation`](CoreError::Validation) never reached the network
//!   and is handled field-level by the immediate caller.
//! - [`Admission`](CoreError::Admission) carries the server's
//!   rejection message verbatim; the caller may re-offer submission
//!   once capacity frees up.
//! - [`Auth`](CoreError::Auth) means the credential was cleared and an
//!   authentication flow must be re-entered.
//! - [`Network`](CoreError::Network) does *not* clear the credential.
//! - [`Observation`](CoreError::Observation) means a poller lost sight
//!   of a job; the job itself has not failed.

/// The closed set of errors the client stack produces.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Bad local input; raised before any network call.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The server rejected a submission on quota/policy grounds.
    /// The message is the server's `detail` field, verbatim.
    #[error("Submission rejected: {0}")]
    Admission(String),

    /// Missing, expired, or invalid credential.
    #[error("Authentication required: {0}")]
    Auth(String),

    /// The request itself failed (connect, DNS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered non-2xx with a structured `detail` body.
    #[error("Server error ({status}): {detail}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// The server's `detail` message, or the raw body if unstructured.
        detail: String,
    },

    /// Polling lost the ability to reach the job endpoint. Distinct
    /// from the job failing; the caller should retry with a fresh
    /// poller rather than treat the job as failed.
    #[error("Lost observation of job: {0}")]
    Observation(String),

    /// The credential storage medium failed on write.
    #[error("Credential persistence failed: {0}")]
    Persistence(String),
}

/// Convenience alias used throughout the client stack.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Whether this error should be surfaced as a global notification.
    ///
    /// Validation errors are field-level and handled by the immediate
    /// caller; everything else is surfaced exactly once.
    pub fn is_notifiable(&self) -> bool {
        !matches!(self, CoreError::Validation(_))
    }
}
