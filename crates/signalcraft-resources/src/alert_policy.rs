//! Alert policies are correlated by external id, not a remote-native id:
//! the upsert endpoint keys on `external_id = "{scope}/{name}"`, and delete
//! addresses the same id. There is no read surface.

use async_trait::async_trait;
use serde_json::{Value, json};

use signalcraft_client::{ApiClient, path_segment};
use signalcraft_core::{IdempotencyKey, ManagedResource, Operation, ResourceKind};

use crate::adapter::{AdapterError, CreateOutcome, ResourceAdapter};
use crate::payload::PayloadBuilder;

pub struct AlertPolicyAdapter;

impl AlertPolicyAdapter {
    fn payload(resource: &ManagedResource) -> Result<Value, AdapterError> {
        let conditions = resource
            .spec_field("conditions")
            .cloned()
            .unwrap_or_else(|| json!([]));
        Ok(PayloadBuilder::new()
            .field("name", resource.identity.name.as_str())
            .field("external_id", resource.identity.external_id())
            .field("severity", resource.spec_str("severity")?)
            .field("routing_key", resource.spec_str("routingKey")?)
            .field("conditions", conditions)
            .build())
    }

    async fn upsert(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<CreateOutcome, AdapterError> {
        let payload = Self::payload(resource)?;
        let key = IdempotencyKey::derive(resource.uid, resource.generation, &Operation::Upsert);
        client
            .post_json("/api/alert-policies/upsert", &payload, &key)
            .await?;
        Ok(CreateOutcome::with_remote_id(resource.identity.external_id()))
    }
}

#[async_trait]
impl ResourceAdapter for AlertPolicyAdapter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::AlertPolicy
    }

    async fn create(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<CreateOutcome, AdapterError> {
        self.upsert(client, resource).await
    }

    async fn update(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<(), AdapterError> {
        self.upsert(client, resource).await.map(|_| ())
    }

    async fn delete(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<(), AdapterError> {
        // The external id is derivable whether or not a create ever
        // succeeded, so the delete is always attempted.
        let external_id = path_segment(&resource.identity.external_id());
        let key = IdempotencyKey::derive(resource.uid, resource.generation, &Operation::Delete);
        client
            .delete(&format!("/api/alert-policies/external/{external_id}"), &key)
            .await?;
        Ok(())
    }

    async fn read(
        &self,
        _client: &ApiClient,
        _resource: &ManagedResource,
    ) -> Result<Option<Value>, AdapterError> {
        Ok(None)
    }
}
