//! Pixora client stack: session lifecycle, job submission, terminal-
//! state polling, and concurrency-limit monitoring.
//!
//! The pieces compose in a fixed order: [`SessionStore`] gates
//! everything, [`JobSubmitter`] creates a job, [`JobPoller`] owns it
//! until a terminal state, and [`NotificationChannel`] reports the
//! outcome. [`ConcurrencyLimitMonitor`] runs an independent periodic
//! loop telling the user whether submission is currently admissible.
//!
//! All network suspension points live in [`ApiClient`]; everything
//! else is pure state-machine plumbing on a single tokio runtime with
//! cooperative, token-based cancellation.

pub mod api;
pub mod config;
pub mod monitor;
pub mod notify;
pub mod poll;
pub mod session;
pub mod submit;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use monitor::ConcurrencyLimitMonitor;
pub use notify::{NotificationChannel, NotificationEvent};
pub use poll::{JobPoller, JobStatusSource, JobStatusUpdate, PollOutcome};
pub use session::SessionStore;
pub use submit::JobSubmitter;
