//! Wire-level tests for the per-kind adapters: paths, methods, payload
//! shapes, and the membership diff flow, all against a mock server.

use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use signalcraft_client::ApiClient;
use signalcraft_config::SyncSettings;
use signalcraft_core::{ManagedResource, ResourceIdentity, ResourceKind};
use signalcraft_resources::{AdapterError, adapter_for};

fn client_for(server: &MockServer) -> ApiClient {
    let settings = SyncSettings::new(&server.uri(), "sk-test").unwrap();
    ApiClient::new(&settings).unwrap()
}

fn resource(kind: ResourceKind, name: &str, spec: Value) -> ManagedResource {
    ManagedResource::new(ResourceIdentity::new("prod", name).unwrap(), kind, spec)
}

#[tokio::test]
async fn alert_policy_upsert_carries_external_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/alert-policies/upsert"))
        .and(body_json(json!({
            "name": "db-latency",
            "external_id": "prod/db-latency",
            "severity": "critical",
            "routing_key": "rk1",
            "conditions": [{"type": "metric", "metric": "p99", "operator": ">", "value": 250.0}]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let res = resource(
        ResourceKind::AlertPolicy,
        "db-latency",
        json!({
            "severity": "critical",
            "routingKey": "rk1",
            "conditions": [{"type": "metric", "metric": "p99", "operator": ">", "value": 250.0}]
        }),
    );
    let outcome = adapter_for(ResourceKind::AlertPolicy)
        .create(&client_for(&server), &res)
        .await
        .unwrap();
    assert_eq!(outcome.remote_id.as_deref(), Some("prod/db-latency"));
}

#[tokio::test]
async fn alert_policy_delete_escapes_external_id() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/alert-policies/external/prod%2Fdb-latency"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let res = resource(
        ResourceKind::AlertPolicy,
        "db-latency",
        json!({"severity": "critical", "routingKey": "rk1"}),
    );
    adapter_for(ResourceKind::AlertPolicy)
        .delete(&client_for(&server), &res)
        .await
        .unwrap();
}

#[tokio::test]
async fn alert_policy_missing_severity_is_blocking() {
    let server = MockServer::start().await;
    let res = resource(ResourceKind::AlertPolicy, "p", json!({"routingKey": "rk1"}));
    let err = adapter_for(ResourceKind::AlertPolicy)
        .create(&client_for(&server), &res)
        .await
        .unwrap_err();
    assert!(err.is_blocking());
    assert!(err.to_string().contains("severity"));
}

#[tokio::test]
async fn team_create_applies_full_member_set() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/teams"))
        .and(body_json(json!({"name": "platform", "description": "infra owners"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "t1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/teams/t1/members"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let res = resource(
        ResourceKind::Team,
        "platform",
        json!({"name": "platform", "description": "infra owners", "members": ["u1", "u2"]}),
    );
    let outcome = adapter_for(ResourceKind::Team)
        .create(&client_for(&server), &res)
        .await
        .unwrap();
    assert_eq!(outcome.remote_id.as_deref(), Some("t1"));
}

#[tokio::test]
async fn team_update_applies_membership_diff() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/teams/t1"))
        .and(body_json(json!({"name": "platform"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    // Remote currently has u1 and u2; desired is u2 and u3.
    Mock::given(method("GET"))
        .and(path("/api/teams/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "t1",
            "name": "platform",
            "members": [{"id": "u1"}, {"id": "u2"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/teams/t1/members"))
        .and(body_json(json!({"userId": "u3"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/teams/t1/members/u1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut res = resource(
        ResourceKind::Team,
        "platform",
        json!({"name": "platform", "members": ["u2", "u3"]}),
    );
    res.remote_id = Some("t1".to_string());
    adapter_for(ResourceKind::Team)
        .update(&client_for(&server), &res)
        .await
        .unwrap();
}

#[tokio::test]
async fn invitation_update_is_refused() {
    let server = MockServer::start().await;
    let mut res = resource(
        ResourceKind::Invitation,
        "oncall-invite",
        json!({"email": "dev@example.com", "role": "responder"}),
    );
    res.remote_id = Some("i1".to_string());

    let err = adapter_for(ResourceKind::Invitation)
        .update(&client_for(&server), &res)
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::UnsupportedUpdate { .. }));
    assert!(err.is_blocking());
}

#[tokio::test]
async fn invitation_read_filters_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/invitations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "i0", "email": "other@example.com", "role": "admin", "status": "pending"},
            {"id": "i1", "email": "dev@example.com", "role": "responder", "status": "pending"}
        ])))
        .mount(&server)
        .await;

    let mut res = resource(
        ResourceKind::Invitation,
        "oncall-invite",
        json!({"email": "dev@example.com"}),
    );
    res.remote_id = Some("i1".to_string());

    let found = adapter_for(ResourceKind::Invitation)
        .read(&client_for(&server), &res)
        .await
        .unwrap()
        .expect("invitation present in listing");
    assert_eq!(found["email"], "dev@example.com");

    res.remote_id = Some("i9".to_string());
    let gone = adapter_for(ResourceKind::Invitation)
        .read(&client_for(&server), &res)
        .await
        .unwrap();
    assert!(gone.is_none());
}

#[tokio::test]
async fn user_create_patches_membership_role() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/workspaces/members/u7"))
        .and(body_json(json!({"role": "admin"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let res = resource(
        ResourceKind::User,
        "u7-role",
        json!({"userId": "u7", "role": "admin"}),
    );
    let outcome = adapter_for(ResourceKind::User)
        .create(&client_for(&server), &res)
        .await
        .unwrap();
    assert_eq!(outcome.remote_id.as_deref(), Some("u7"));
}

#[tokio::test]
async fn workspace_delete_is_a_noop() {
    let server = MockServer::start().await;
    // No mocks mounted: any remote call would fail the test.
    let mut res = resource(ResourceKind::Workspace, "main", json!({"name": "Acme"}));
    res.remote_id = Some("workspace".to_string());
    adapter_for(ResourceKind::Workspace)
        .delete(&client_for(&server), &res)
        .await
        .unwrap();
}

#[tokio::test]
async fn id_kind_delete_without_remote_id_is_already_absent() {
    let server = MockServer::start().await;
    let res = resource(
        ResourceKind::Schedule,
        "primary",
        json!({"name": "primary", "timezone": "UTC"}),
    );
    adapter_for(ResourceKind::Schedule)
        .delete(&client_for(&server), &res)
        .await
        .unwrap();
}
