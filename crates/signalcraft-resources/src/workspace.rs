//! The workspace is a remote singleton: settings are replaced with PUT and
//! never deleted. The local record still runs the full finalizer protocol;
//! its delete step just has no remote work to do.

use async_trait::async_trait;
use serde_json::Value;

use signalcraft_client::ApiClient;
use signalcraft_core::{IdempotencyKey, ManagedResource, Operation, ResourceKind};

use crate::adapter::{AdapterError, CreateOutcome, ResourceAdapter};
use crate::payload::PayloadBuilder;

const SETTINGS: &str = "/settings/workspace";

/// Fixed remote id for the singleton.
const WORKSPACE_ID: &str = "workspace";

pub struct WorkspaceAdapter;

impl WorkspaceAdapter {
    async fn put_settings(
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<(), AdapterError> {
        let payload = PayloadBuilder::new()
            .field("name", resource.spec_str("name")?)
            .build();
        let key = IdempotencyKey::derive(resource.uid, resource.generation, &Operation::Upsert);
        client.put_json(SETTINGS, &payload, &key).await?;
        Ok(())
    }
}

#[async_trait]
impl ResourceAdapter for WorkspaceAdapter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Workspace
    }

    async fn create(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<CreateOutcome, AdapterError> {
        Self::put_settings(client, resource).await?;
        Ok(CreateOutcome::with_remote_id(WORKSPACE_ID))
    }

    async fn update(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<(), AdapterError> {
        Self::put_settings(client, resource).await
    }

    async fn delete(
        &self,
        _client: &ApiClient,
        _resource: &ManagedResource,
    ) -> Result<(), AdapterError> {
        Ok(())
    }

    async fn read(
        &self,
        client: &ApiClient,
        _resource: &ManagedResource,
    ) -> Result<Option<Value>, AdapterError> {
        let resp = client.get_json(SETTINGS).await?;
        Ok(resp.body)
    }
}
