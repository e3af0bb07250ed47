//! User-facing notification channel.
//!
//! A simple multiset with insertion-order display and per-item
//! expiry: no deduplication, no priority. Each posted notification is
//! independently scheduled for removal after its own TTL; a zero TTL
//! persists until explicit dismissal. Consumers subscribe to
//! [`NotificationEvent`]s on a broadcast channel to re-render.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;

use pixora_core::error::CoreError;
use pixora_core::notification::{Notification, NotificationId, NotificationKind, DEFAULT_TTL};

/// Broadcast buffer size for change events.
const EVENT_CAPACITY: usize = 64;

/// A change to the set of live notifications.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    Posted(Notification),
    Dismissed(NotificationId),
    Expired(NotificationId),
}

struct Inner {
    items: Mutex<Vec<Notification>>,
    next_id: AtomicU64,
    events: broadcast::Sender<NotificationEvent>,
}

/// Cheaply cloneable handle to one notification multiset.
#[derive(Clone)]
pub struct NotificationChannel {
    inner: Arc<Inner>,
}

impl NotificationChannel {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                items: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                events,
            }),
        }
    }

    /// Post a notification with the default 5-second TTL.
    pub fn post(&self, kind: NotificationKind, message: impl Into<String>) -> NotificationId {
        self.post_with_ttl(kind, message, DEFAULT_TTL)
    }

    /// Post a notification with an explicit TTL. `Duration::ZERO`
    /// means "persist until explicit dismissal."
    pub fn post_with_ttl(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        ttl: Duration,
    ) -> NotificationId {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let notification = Notification {
            id,
            kind,
            message: message.into(),
            ttl,
            posted_at: chrono::Utc::now(),
        };

        self.inner
            .items
            .lock()
            .expect("notification lock")
            .push(notification.clone());
        let _ = self
            .inner
            .events
            .send(NotificationEvent::Posted(notification));

        if !ttl.is_zero() {
            let channel = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(ttl).await;
                channel.expire(id);
            });
        }

        id
    }

    /// Dismiss one notification. Returns `false` if it was already
    /// gone; other notifications are unaffected either way.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        if self.remove(id) {
            let _ = self.inner.events.send(NotificationEvent::Dismissed(id));
            true
        } else {
            false
        }
    }

    /// Live notifications in arrival order.
    pub fn active(&self) -> Vec<Notification> {
        self.inner
            .items
            .lock()
            .expect("notification lock")
            .clone()
    }

    /// Subscribe to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }

    /// Surface an error to the user, once.
    ///
    /// Validation errors are field-level and never become a global
    /// notification; admission rejections read as warnings (capacity
    /// may free up), everything else as errors.
    pub fn report_error(&self, error: &CoreError) -> Option<NotificationId> {
        if !error.is_notifiable() {
            return None;
        }
        let kind = match error {
            CoreError::Admission(_) => NotificationKind::Warning,
            _ => NotificationKind::Error,
        };
        Some(self.post(kind, error.to_string()))
    }

    fn expire(&self, id: NotificationId) {
        if self.remove(id) {
            let _ = self.inner.events.send(NotificationEvent::Expired(id));
        }
    }

    fn remove(&self, id: NotificationId) -> bool {
        let mut items = self.inner.items.lock().expect("notification lock");
        let before = items.len();
        items.retain(|n| n.id != id);
        items.len() != before
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
