//! End-to-end tests for authentication, account, and capacity
//! endpoints against the mock backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;

use common::{spawn_backend, MOCK_TOKEN};
use pixora_client::{ApiClient, ConcurrencyLimitMonitor, SessionStore};
use pixora_core::job::JobStatus;
use pixora_core::limits::CapacityFill;
use pixora_core::CoreError;

// ---------------------------------------------------------------------------
// OAuth exchange and profile
// ---------------------------------------------------------------------------

#[tokio::test]
async fn oauth_exchange_stores_credential_and_unlocks_profile() {
    let backend = spawn_backend().await;
    let session = Arc::new(SessionStore::in_memory());
    let api = ApiClient::new(backend.base_url.clone(), session.clone());

    let token = api
        .exchange_oauth_code("good-code")
        .await
        .expect("exchange should succeed");
    assert_eq!(token, MOCK_TOKEN);
    assert_eq!(session.credential().as_deref(), Some(MOCK_TOKEN));

    let profile = api.me().await.expect("profile should resolve");
    assert_eq!(profile.id, "user-1");
    assert_eq!(profile.email.as_deref(), Some("fox@example.com"));
}

#[tokio::test]
async fn bad_oauth_code_passes_server_detail_through() {
    let backend = spawn_backend().await;
    let session = Arc::new(SessionStore::in_memory());
    let api = ApiClient::new(backend.base_url.clone(), session.clone());

    let error = api
        .exchange_oauth_code("bad-code")
        .await
        .expect_err("bad code must fail");
    assert_matches!(
        error,
        CoreError::Server { status: 400, ref detail } if detail == "invalid authorization code"
    );
    assert!(session.credential().is_none());
}

#[tokio::test]
async fn profile_without_credential_is_auth_error() {
    let backend = spawn_backend().await;
    let session = Arc::new(SessionStore::in_memory());
    let api = ApiClient::new(backend.base_url.clone(), session);

    let error = api.me().await.expect_err("unauthenticated must fail");
    assert_matches!(error, CoreError::Auth(_));
}

// ---------------------------------------------------------------------------
// Concurrency limits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn limits_snapshot_parses_and_derives_fill() {
    let backend = spawn_backend().await;
    let session = Arc::new(SessionStore::in_memory());
    session.set_credential(MOCK_TOKEN).expect("in-memory set");
    let api = ApiClient::new(backend.base_url.clone(), session);

    let limits = api.limits().await.expect("limits should resolve");
    assert_eq!(limits.plan_id, "basic");
    assert_eq!(limits.total.fill(), CapacityFill::Percent(40));
    assert_eq!(limits.image.fill(), CapacityFill::Percent(66));
    assert_eq!(limits.video.fill(), CapacityFill::Unlimited);
}

#[tokio::test]
async fn monitor_publishes_live_snapshots() {
    let backend = spawn_backend().await;
    let session = Arc::new(SessionStore::in_memory());
    session.set_credential(MOCK_TOKEN).expect("in-memory set");
    let api = Arc::new(ApiClient::new(backend.base_url.clone(), session));

    let monitor = ConcurrencyLimitMonitor::new(api);
    let mut rx = monitor.subscribe();
    monitor.start(Duration::from_millis(10));

    // Wait for the first successful publication.
    rx.changed().await.expect("monitor should publish");
    let snapshot = rx.borrow_and_update().clone().expect("live snapshot");
    assert_eq!(snapshot.total.active, 2);

    // A server-side change shows up on a later tick.
    *backend.state.limits_body.lock().expect("limits lock") = json!({
        "plan_id": "basic",
        "limits": {"total": 5, "image": 3, "video": -1},
        "active_counts": {"total": 5, "image": 3, "video": 0},
        "pending_counts": {"total": 0, "image": 0, "video": 0},
    });

    let updated = loop {
        rx.changed().await.expect("monitor should keep publishing");
        let snapshot = rx.borrow_and_update().clone().expect("live snapshot");
        if snapshot.total.active == 5 {
            break snapshot;
        }
    };
    assert_eq!(updated.total.fill(), CapacityFill::Percent(100));

    monitor.stop().await;
}

// ---------------------------------------------------------------------------
// History listings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn job_history_pages_parse_typed_records() {
    let backend = spawn_backend().await;
    let session = Arc::new(SessionStore::in_memory());
    session.set_credential(MOCK_TOKEN).expect("in-memory set");
    let api = ApiClient::new(backend.base_url.clone(), session);

    let page = api
        .jobs(1, 20, Some(JobStatus::Completed))
        .await
        .expect("history should resolve");
    assert_eq!(page.total, 2);
    assert!(!page.has_next());
    assert_eq!(page.items[0].job_id, "j1");
    assert_eq!(page.items[0].status, JobStatus::Completed);
    assert_eq!(page.items[1].status, JobStatus::Failed);
}

#[tokio::test]
async fn transactions_parse_signed_amounts() {
    let backend = spawn_backend().await;
    let session = Arc::new(SessionStore::in_memory());
    session.set_credential(MOCK_TOKEN).expect("in-memory set");
    let api = ApiClient::new(backend.base_url.clone(), session);

    let page = api
        .transactions(1, 20, None)
        .await
        .expect("transactions should resolve");
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].amount, -4);
    assert_eq!(page.items[0].tx_type, "generation");
    assert_eq!(page.items[1].amount, 100);
}
