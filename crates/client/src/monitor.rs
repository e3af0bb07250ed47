//! Periodic concurrency-limit monitoring.
//!
//! [`ConcurrencyLimitMonitor`] runs an independent loop, orthogonal to
//! any single job, fetching the account's concurrency snapshot so the
//! user can see whether submission is currently admissible. Failures
//! are soft: the last known snapshot is retained and nothing is
//! surfaced to the user: a capacity display degrading to "no live
//! data" beats a false alarm. The loop never fetches while no
//! credential is present.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use pixora_core::limits::ConcurrencyLimits;

use crate::api::ApiClient;

/// Background task state while the monitor is running.
struct MonitorTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Periodically publishes [`ConcurrencyLimits`] snapshots on a watch
/// channel.
pub struct ConcurrencyLimitMonitor {
    api: Arc<ApiClient>,
    tx: watch::Sender<Option<ConcurrencyLimits>>,
    task: Mutex<Option<MonitorTask>>,
}

impl ConcurrencyLimitMonitor {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            api,
            tx,
            task: Mutex::new(None),
        }
    }

    /// Subscribe to snapshot updates. `None` means no live data yet.
    pub fn subscribe(&self) -> watch::Receiver<Option<ConcurrencyLimits>> {
        self.tx.subscribe()
    }

    /// The most recent snapshot, if any tick has succeeded.
    pub fn latest(&self) -> Option<ConcurrencyLimits> {
        self.tx.borrow().clone()
    }

    /// Start the periodic loop. Replaces a previously running loop.
    pub fn start(&self, interval: Duration) {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            self.api.clone(),
            self.tx.clone(),
            interval,
            cancel.clone(),
        ));

        let previous = self
            .task
            .lock()
            .expect("monitor task lock")
            .replace(MonitorTask { cancel, handle });
        if let Some(previous) = previous {
            previous.cancel.cancel();
        }
    }

    /// Stop the loop and wait for it to wind down. One in-flight
    /// fetch may still complete; its result is discarded.
    pub async fn stop(&self) {
        let task = self.task.lock().expect("monitor task lock").take();
        if let Some(task) = task {
            task.cancel.cancel();
            let _ = task.handle.await;
        }
    }
}

/// The monitor loop body, separated so tests can drive it directly.
pub async fn run_loop(
    api: Arc<ApiClient>,
    tx: watch::Sender<Option<ConcurrencyLimits>>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Limit monitor cancelled");
                return;
            }
            _ = ticker.tick() => {}
        }

        // Guard against authentication-loop errors on public views.
        if api.session().credential().is_none() {
            continue;
        }

        match api.limits().await {
            Ok(snapshot) => {
                tx.send_replace(Some(snapshot));
            }
            Err(e) => {
                // Soft-fail: keep the last snapshot, log, move on.
                tracing::warn!(error = %e, "Limit snapshot fetch failed");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use pixora_core::limits::{CategoryCounts, UNLIMITED};

    fn snapshot(active: u32, limit: i64) -> ConcurrencyLimits {
        let counts = CategoryCounts {
            limit,
            active,
            pending: 0,
        };
        ConcurrencyLimits {
            plan_id: "basic".into(),
            total: counts,
            image: counts,
            video: CategoryCounts {
                limit: UNLIMITED,
                active: 0,
                pending: 0,
            },
        }
    }

    #[tokio::test]
    async fn starts_with_no_live_data() {
        let session = Arc::new(SessionStore::in_memory());
        let monitor =
            ConcurrencyLimitMonitor::new(Arc::new(ApiClient::new("http://127.0.0.1:9", session)));
        assert!(monitor.latest().is_none());
    }

    #[tokio::test]
    async fn loop_skips_fetch_without_credential() {
        // Unreachable backend: any attempted fetch would publish
        // nothing anyway, but the guard means we never even try.
        let session = Arc::new(SessionStore::in_memory());
        let api = Arc::new(ApiClient::new("http://127.0.0.1:9", session));
        let (tx, rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_loop(
            api,
            tx,
            Duration::from_millis(5),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel.cancel();
        task.await.expect("loop should exit cleanly");

        assert!(rx.borrow().is_none());
    }

    #[tokio::test]
    async fn stop_without_start_is_a_no_op() {
        let session = Arc::new(SessionStore::in_memory());
        let monitor =
            ConcurrencyLimitMonitor::new(Arc::new(ApiClient::new("http://127.0.0.1:9", session)));
        monitor.stop().await;
    }

    #[tokio::test]
    async fn fetch_failure_retains_last_snapshot() {
        // Publish a snapshot by hand, then run the loop against an
        // unreachable backend with a present credential: every tick
        // fails and the published value must survive.
        let session = Arc::new(SessionStore::in_memory());
        session
            .set_credential("header.payload.sig")
            .expect("in-memory set");
        let api = Arc::new(ApiClient::new("http://127.0.0.1:9", session));

        let (tx, rx) = watch::channel(Some(snapshot(2, 5)));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_loop(
            api,
            tx,
            Duration::from_millis(5),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(40)).await;
        cancel.cancel();
        task.await.expect("loop should exit cleanly");

        let kept = rx.borrow().clone().expect("snapshot retained");
        assert_eq!(kept.total.active, 2);
    }
}
