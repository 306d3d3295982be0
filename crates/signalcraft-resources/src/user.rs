//! Users are workspace members managed in place: the engine only converges
//! the membership role. Create and update are the same PATCH; reads list
//! the workspace members and filter client-side.

use async_trait::async_trait;
use serde_json::{Value, json};

use signalcraft_client::{ApiClient, path_segment};
use signalcraft_core::{IdempotencyKey, ManagedResource, Operation, ResourceKind};

use crate::adapter::{AdapterError, CreateOutcome, ResourceAdapter};

const MEMBERS: &str = "/workspaces/members";

pub struct UserAdapter;

impl UserAdapter {
    async fn patch_role(
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<String, AdapterError> {
        let user_id = resource.spec_str("userId")?.to_string();
        let payload = json!({"role": resource.spec_str("role")?});
        let key = IdempotencyKey::derive(resource.uid, resource.generation, &Operation::Upsert);
        client
            .patch_json(&format!("{MEMBERS}/{}", path_segment(&user_id)), &payload, &key)
            .await?;
        Ok(user_id)
    }
}

#[async_trait]
impl ResourceAdapter for UserAdapter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::User
    }

    async fn create(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<CreateOutcome, AdapterError> {
        let user_id = Self::patch_role(client, resource).await?;
        Ok(CreateOutcome::with_remote_id(user_id))
    }

    async fn update(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<(), AdapterError> {
        Self::patch_role(client, resource).await.map(|_| ())
    }

    async fn delete(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<(), AdapterError> {
        let Some(user_id) = resource.remote_id.as_deref() else {
            return Ok(());
        };
        let key = IdempotencyKey::derive(resource.uid, resource.generation, &Operation::Delete);
        client
            .delete(&format!("{MEMBERS}/{}", path_segment(user_id)), &key)
            .await?;
        Ok(())
    }

    async fn read(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<Option<Value>, AdapterError> {
        let Some(user_id) = resource.remote_id.as_deref() else {
            return Ok(None);
        };
        let resp = client.get_json(MEMBERS).await?;
        let found = resp
            .json()
            .and_then(Value::as_array)
            .and_then(|members| {
                members
                    .iter()
                    .find(|member| member.get("id").and_then(Value::as_str) == Some(user_id))
            })
            .cloned();
        Ok(found)
    }
}
