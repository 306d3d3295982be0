//! End-to-end reconcile tests: an in-memory source store on one side, a
//! mock SignalCraft API on the other.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use signalcraft_client::ApiClient;
use signalcraft_config::SyncSettings;
use signalcraft_core::{ManagedResource, ResourceIdentity, ResourceKind, SyncState};
use signalcraft_engine::{MemorySourceStore, Outcome, Reconciler, SourceStore};

const RETRY: Duration = Duration::from_secs(1);

/// Opt-in tracing for debugging a failing test: RUST_LOG=signalcraft=debug
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn client_for(server: &MockServer) -> ApiClient {
    let settings = SyncSettings::new(&server.uri(), "sk-test").unwrap();
    ApiClient::new(&settings).unwrap()
}

fn reconciler_for(
    server: &MockServer,
    store: Arc<MemorySourceStore>,
) -> Reconciler<Arc<MemorySourceStore>> {
    Reconciler::new(store, Some(client_for(server))).with_requeue_delay(RETRY)
}

fn alert_policy(name: &str) -> ManagedResource {
    ManagedResource::new(
        ResourceIdentity::new("monitoring", name).unwrap(),
        ResourceKind::AlertPolicy,
        json!({"severity": "critical", "routingKey": "rk1", "conditions": []}),
    )
}

fn schedule(name: &str) -> ManagedResource {
    ManagedResource::new(
        ResourceIdentity::new("prod", name).unwrap(),
        ResourceKind::Schedule,
        json!({"name": name, "timezone": "UTC"}),
    )
}

#[tokio::test]
async fn scenario_generation_advances_through_failure_and_retry() {
    init_tracing();
    let server = MockServer::start().await;
    let upsert = || Mock::given(method("POST")).and(path("/api/alert-policies/upsert"));
    // First sync succeeds, the generation-2 attempt hits a 500, the retry
    // succeeds again.
    upsert()
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    upsert()
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    upsert()
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySourceStore::new());
    let reconciler = reconciler_for(&server, Arc::clone(&store));
    let resource = alert_policy("db-latency");
    let identity = resource.identity.clone();
    store.insert(resource).await;

    assert_eq!(reconciler.reconcile(&identity).await.unwrap(), Outcome::Done);
    let synced = store.get(&identity).await.unwrap().unwrap();
    assert_eq!(synced.status.state, SyncState::Synced);
    assert_eq!(synced.status.observed_generation, 1);
    assert!(synced.finalizer_attached);
    assert_eq!(synced.remote_id.as_deref(), Some("monitoring/db-latency"));

    store
        .edit_spec(
            &identity,
            json!({"severity": "critical", "routingKey": "rk2", "conditions": []}),
        )
        .await
        .unwrap();

    assert_eq!(
        reconciler.reconcile(&identity).await.unwrap(),
        Outcome::Requeue(RETRY)
    );
    let failed = store.get(&identity).await.unwrap().unwrap();
    assert_eq!(failed.status.state, SyncState::Error);
    assert_eq!(failed.status.observed_generation, 1);
    assert!(failed.status.message.contains("500"));

    assert_eq!(reconciler.reconcile(&identity).await.unwrap(), Outcome::Done);
    let recovered = store.get(&identity).await.unwrap().unwrap();
    assert_eq!(recovered.status.state, SyncState::Synced);
    assert_eq!(recovered.status.observed_generation, 2);
}

#[tokio::test]
async fn finalizer_survives_failed_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/oncall/rotations/r1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySourceStore::new());
    let reconciler = reconciler_for(&server, Arc::clone(&store));
    let mut resource = schedule("primary");
    resource.finalizer_attached = true;
    resource.remote_id = Some("r1".to_string());
    let identity = resource.identity.clone();
    store.insert(resource).await;
    store.request_deletion(&identity).await.unwrap();

    assert_eq!(
        reconciler.reconcile(&identity).await.unwrap(),
        Outcome::Requeue(RETRY)
    );
    let record = store.get(&identity).await.unwrap().unwrap();
    assert!(record.finalizer_attached, "finalizer must never drop on failure");
    assert_eq!(record.status.state, SyncState::Error);
    assert!(record.status.message.contains("503"));
}

#[tokio::test]
async fn delete_of_already_absent_remote_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/oncall/rotations/r1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySourceStore::new());
    let reconciler = reconciler_for(&server, Arc::clone(&store));
    let mut resource = schedule("primary");
    resource.finalizer_attached = true;
    resource.remote_id = Some("r1".to_string());
    let identity = resource.identity.clone();
    store.insert(resource).await;
    store.request_deletion(&identity).await.unwrap();

    assert_eq!(reconciler.reconcile(&identity).await.unwrap(), Outcome::Done);
    assert!(
        !store.contains(&identity).await,
        "record is dropped once the finalizer clears"
    );
}

#[tokio::test]
async fn deletion_without_finalizer_owes_nothing() {
    let server = MockServer::start().await;
    // No mocks: any remote call would fail the pass.
    let store = Arc::new(MemorySourceStore::new());
    let reconciler = reconciler_for(&server, Arc::clone(&store));
    let mut resource = schedule("scratch");
    resource.request_deletion();
    let identity = resource.identity.clone();
    store.insert(resource).await;

    assert_eq!(reconciler.reconcile(&identity).await.unwrap(), Outcome::Done);
}

#[tokio::test]
async fn missing_configuration_is_a_per_object_error() {
    let store = Arc::new(MemorySourceStore::new());
    let reconciler = Reconciler::new(Arc::clone(&store), None);
    let resource = schedule("primary");
    let identity = resource.identity.clone();
    store.insert(resource).await;

    let outcome = reconciler.reconcile(&identity).await.unwrap();
    assert_eq!(outcome, Outcome::Requeue(Duration::from_secs(60)));

    let record = store.get(&identity).await.unwrap().unwrap();
    assert_eq!(record.status.state, SyncState::Error);
    assert!(record.status.message.contains("SIGNALCRAFT_API_URL"));
    assert_eq!(record.status.observed_generation, 0);
    // The finalizer was still attached first: the delete obligation exists
    // before the first remote call ever happens.
    assert!(record.finalizer_attached);
}

#[tokio::test]
async fn create_learns_remote_id_and_updates_in_place() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/oncall/rotations"))
        .and(body_json(json!({"name": "primary", "timezone": "UTC"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "r42"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/oncall/rotations/r42"))
        .and(body_json(json!({"name": "primary", "timezone": "Europe/Berlin"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySourceStore::new());
    let reconciler = reconciler_for(&server, Arc::clone(&store));
    let resource = schedule("primary");
    let identity = resource.identity.clone();
    store.insert(resource).await;

    assert_eq!(reconciler.reconcile(&identity).await.unwrap(), Outcome::Done);
    let created = store.get(&identity).await.unwrap().unwrap();
    assert_eq!(created.remote_id.as_deref(), Some("r42"));

    // A converged record is a no-op pass.
    assert_eq!(reconciler.reconcile(&identity).await.unwrap(), Outcome::Done);

    store
        .edit_spec(&identity, json!({"name": "primary", "timezone": "Europe/Berlin"}))
        .await
        .unwrap();
    assert_eq!(reconciler.reconcile(&identity).await.unwrap(), Outcome::Done);
    let updated = store.get(&identity).await.unwrap().unwrap();
    assert_eq!(updated.status.observed_generation, 2);
}

#[tokio::test]
async fn superseded_pass_abandons_its_status_write() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/alert-policies/upsert"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySourceStore::new());
    let reconciler = reconciler_for(&server, Arc::clone(&store));
    let resource = alert_policy("db-latency");
    let identity = resource.identity.clone();
    store.insert(resource).await;

    let edit_store = Arc::clone(&store);
    let edit_identity = identity.clone();
    let (outcome, _) = tokio::join!(reconciler.reconcile(&identity), async move {
        // Land a spec edit while the remote call is in flight.
        tokio::time::sleep(Duration::from_millis(100)).await;
        edit_store
            .edit_spec(
                &edit_identity,
                json!({"severity": "warning", "routingKey": "rk1", "conditions": []}),
            )
            .await
            .unwrap();
    });

    // The stale pass lost the CAS race and abandoned its write.
    assert_eq!(outcome.unwrap(), Outcome::Done);
    let record = store.get(&identity).await.unwrap().unwrap();
    assert_eq!(record.generation, 2);
    assert_eq!(record.status.state, SyncState::Pending);
    assert_eq!(record.status.observed_generation, 0);
}

#[tokio::test]
async fn invalid_spec_is_surfaced_not_retried_into_success() {
    let server = MockServer::start().await;
    let store = Arc::new(MemorySourceStore::new());
    let reconciler = reconciler_for(&server, Arc::clone(&store));
    // Missing routingKey: the payload cannot be built.
    let resource = ManagedResource::new(
        ResourceIdentity::new("monitoring", "broken").unwrap(),
        ResourceKind::AlertPolicy,
        json!({"severity": "critical"}),
    );
    let identity = resource.identity.clone();
    store.insert(resource).await;

    assert_eq!(
        reconciler.reconcile(&identity).await.unwrap(),
        Outcome::Requeue(RETRY)
    );
    let record = store.get(&identity).await.unwrap().unwrap();
    assert_eq!(record.status.state, SyncState::Error);
    assert!(record.status.message.contains("routingKey"));
}

#[tokio::test]
async fn reconcile_all_visits_every_identity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/alert-policies/upsert"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySourceStore::new());
    let reconciler = reconciler_for(&server, Arc::clone(&store));
    store.insert(alert_policy("db-latency")).await;
    store.insert(alert_policy("api-errors")).await;

    let outcomes = reconciler.reconcile_all().await.unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|(_, o)| *o == Outcome::Done));
}
