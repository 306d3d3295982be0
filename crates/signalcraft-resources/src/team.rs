//! Teams carry a membership sub-collection converged by diffing. Creation
//! applies the full desired member set (current is implicitly empty);
//! updates read the current remote members and apply minimal add/remove
//! calls, each carrying its own deterministic idempotency key so a partial
//! application resumes cleanly on the next pass.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::{Value, json};

use signalcraft_client::{ApiClient, path_segment};
use signalcraft_core::{IdempotencyKey, ManagedResource, Operation, ResourceKind, diff};

use crate::adapter::{AdapterError, CreateOutcome, ResourceAdapter, require_remote_id};
use crate::id_crud;
use crate::payload::{PayloadBuilder, member_set};

const COLLECTION: &str = "/api/teams";

pub struct TeamAdapter;

impl TeamAdapter {
    fn payload(resource: &ManagedResource) -> Result<Value, AdapterError> {
        Ok(PayloadBuilder::new()
            .field("name", resource.spec_str("name")?)
            .optional_from(resource, "description")
            .build())
    }

    async fn add_member(
        client: &ApiClient,
        resource: &ManagedResource,
        team_id: &str,
        user_id: &str,
    ) -> Result<(), AdapterError> {
        let key = IdempotencyKey::derive(
            resource.uid,
            resource.generation,
            &Operation::MemberAdd(user_id.to_string()),
        );
        client
            .post_json(
                &format!("{COLLECTION}/{}/members", path_segment(team_id)),
                &json!({"userId": user_id}),
                &key,
            )
            .await?;
        Ok(())
    }

    async fn remove_member(
        client: &ApiClient,
        resource: &ManagedResource,
        team_id: &str,
        user_id: &str,
    ) -> Result<(), AdapterError> {
        let key = IdempotencyKey::derive(
            resource.uid,
            resource.generation,
            &Operation::MemberRemove(user_id.to_string()),
        );
        client
            .delete(
                &format!(
                    "{COLLECTION}/{}/members/{}",
                    path_segment(team_id),
                    path_segment(user_id)
                ),
                &key,
            )
            .await?;
        Ok(())
    }

    /// Current member ids from the team detail response.
    fn current_members(detail: &Value) -> BTreeSet<String> {
        detail
            .get("members")
            .and_then(Value::as_array)
            .map(|members| {
                members
                    .iter()
                    .filter_map(|m| m.get("id").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl ResourceAdapter for TeamAdapter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Team
    }

    async fn create(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<CreateOutcome, AdapterError> {
        let desired = member_set(resource)?;
        let outcome =
            id_crud::create_in(client, COLLECTION, &Self::payload(resource)?, resource).await?;

        if let Some(team_id) = outcome.remote_id.as_deref() {
            for user_id in &desired {
                Self::add_member(client, resource, team_id, user_id).await?;
            }
        }
        Ok(outcome)
    }

    async fn update(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<(), AdapterError> {
        let desired = member_set(resource)?;
        id_crud::update_in(client, COLLECTION, &Self::payload(resource)?, resource, self.kind())
            .await?;

        let team_id = require_remote_id(resource, self.kind())?;
        let detail = client
            .get_json(&format!("{COLLECTION}/{}", path_segment(team_id)))
            .await?;
        let current = detail.json().map(Self::current_members).unwrap_or_default();

        let delta = diff(&current, &desired);
        tracing::debug!(
            identity = %resource.identity,
            add = delta.to_add.len(),
            remove = delta.to_remove.len(),
            "converging team membership"
        );
        for user_id in &delta.to_add {
            Self::add_member(client, resource, team_id, user_id).await?;
        }
        for user_id in &delta.to_remove {
            Self::remove_member(client, resource, team_id, user_id).await?;
        }
        Ok(())
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
        id_crud::read_in(client, COLLECTION, resource).await
    }
}
