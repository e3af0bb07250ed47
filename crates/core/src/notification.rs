//! Ephemeral user-facing notification records.
//!
//! A notification is a simple multiset entry: arrival-ordered, no
//! deduplication, no priority, each with its own time-to-live. The
//! scheduling of expiry lives in the client crate; this module only
//! defines the data.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Default time-to-live for a posted notification.
pub const DEFAULT_TTL: Duration = Duration::from_millis(5000);

/// Monotonic per-channel notification identifier.
pub type NotificationId = u64;

/// Severity/flavor of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

/// One user-visible notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Channel-assigned identifier, unique per channel.
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    /// Time-to-live; zero means "persist until explicit dismissal".
    pub ttl: Duration,
    /// When the notification was posted (UTC).
    pub posted_at: Timestamp,
}

impl Notification {
    /// Whether this notification sticks around until dismissed.
    pub fn is_sticky(&self) -> bool {
        self.ttl.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn zero_ttl_means_sticky() {
        let n = Notification {
            id: 1,
            kind: NotificationKind::Error,
            message: "boom".into(),
            ttl: Duration::ZERO,
            posted_at: Utc::now(),
        };
        assert!(n.is_sticky());
    }

    #[test]
    fn default_ttl_is_not_sticky() {
        let n = Notification {
            id: 2,
            kind: NotificationKind::Info,
            message: "hello".into(),
            ttl: DEFAULT_TTL,
            posted_at: Utc::now(),
        };
        assert!(!n.is_sticky());
    }
}
