//! Invitations have no per-id read endpoint; reads list all pending
//! invitations and filter client-side. The remote API has no invitation
//! update either, so updates are refused outright rather than silently
//! recreated.

use async_trait::async_trait;
use serde_json::Value;

use signalcraft_client::ApiClient;
use signalcraft_core::{ManagedResource, ResourceKind};

use crate::adapter::{AdapterError, CreateOutcome, ResourceAdapter};
use crate::id_crud;
use crate::payload::PayloadBuilder;

const COLLECTION: &str = "/api/invitations";

pub struct InvitationAdapter;

impl InvitationAdapter {
    fn payload(resource: &ManagedResource) -> Result<Value, AdapterError> {
        Ok(PayloadBuilder::new()
            .field("email", resource.spec_str("email")?)
            .optional_from(resource, "role")
            .build())
    }
}

#[async_trait]
impl ResourceAdapter for InvitationAdapter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Invitation
    }

    async fn create(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<CreateOutcome, AdapterError> {
        id_crud::create_in(client, COLLECTION, &Self::payload(resource)?, resource).await
    }

    async fn update(
        &self,
        _client: &ApiClient,
        _resource: &ManagedResource,
    ) -> Result<(), AdapterError> {
        Err(AdapterError::UnsupportedUpdate { kind: self.kind() })
    }

    async fn delete(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<(), AdapterError> {
        id_crud::delete_in(client, COLLECTION, resource).await
    }

    async fn read(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<Option<Value>, AdapterError> {
        let Some(id) = resource.remote_id.as_deref() else {
            return Ok(None);
        };
        let resp = client.get_json(COLLECTION).await?;
        let found = resp
            .json()
            .and_then(Value::as_array)
            .and_then(|invitations| {
                invitations
                    .iter()
                    .find(|invite| invite.get("id").and_then(Value::as_str) == Some(id))
            })
            .cloned();
        Ok(found)
    }
}
