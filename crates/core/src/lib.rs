//! Pixora domain types and pure logic.
//!
//! This crate holds everything the client stack shares that does not
//! touch the network or the runtime:
//!
//! - [`error::CoreError`] — the closed error taxonomy every operation
//!   reports through.
//! - [`job`] — generation job kinds, the job status state machine, and
//!   the [`Job`](job::Job) lifecycle record.
//! - [`claims`] — unverified JWT claim inspection for client-side
//!   session gating.
//! - [`limits`] — concurrency snapshot types and capacity-fill math.
//! - [`models`] — the generation model registry used for submit-time
//!   validation and cost estimates.
//! - [`notification`] — ephemeral user-facing notification records.
//! - [`history`] — paginated job-history and credit-transaction
//!   response shapes.

pub mod claims;
pub mod error;
pub mod history;
pub mod job;
pub mod limits;
pub mod models;
pub mod notification;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use job::{Job, JobKind, JobStatus};
pub use limits::{CapacityFill, CategoryCounts, ConcurrencyLimits};
