//! Shared CRUD plumbing for kinds correlated by a remote-native id:
//! `POST {collection}` to create, `GET/PUT/DELETE {collection}/{id}`
//! afterwards. The created id is read from the response body.

use serde_json::Value;

use signalcraft_client::{ApiClient, path_segment};
use signalcraft_core::{IdempotencyKey, ManagedResource, Operation, ResourceKind};

use crate::adapter::{AdapterError, CreateOutcome, require_remote_id};

pub(crate) async fn create_in(
    client: &ApiClient,
    collection: &str,
    payload: &Value,
    resource: &ManagedResource,
) -> Result<CreateOutcome, AdapterError> {
    let key = IdempotencyKey::derive(resource.uid, resource.generation, &Operation::Upsert);
    let resp = client.post_json(collection, payload, &key).await?;
    Ok(CreateOutcome {
        remote_id: resp.field_str("id").map(str::to_string),
    })
}

pub(crate) async fn update_in(
    client: &ApiClient,
    collection: &str,
    payload: &Value,
    resource: &ManagedResource,
    kind: ResourceKind,
) -> Result<(), AdapterError> {
    let id = require_remote_id(resource, kind)?;
    let key = IdempotencyKey::derive(resource.uid, resource.generation, &Operation::Upsert);
    client
        .put_json(&format!("{collection}/{}", path_segment(id)), payload, &key)
        .await?;
    Ok(())
}

/// Delete by id. A resource that never got a remote id has nothing to
/// remove, which counts as already absent.
pub(crate) async fn delete_in(
    client: &ApiClient,
    collection: &str,
    resource: &ManagedResource,
) -> Result<(), AdapterError> {
    let Some(id) = resource.remote_id.as_deref() else {
        return Ok(());
    };
    let key = IdempotencyKey::derive(resource.uid, resource.generation, &Operation::Delete);
    client
        .delete(&format!("{collection}/{}", path_segment(id)), &key)
        .await?;
    Ok(())
}

/// Read by id; 404 means the object is gone, reported as `None`.
pub(crate) async fn read_in(
    client: &ApiClient,
    collection: &str,
    resource: &ManagedResource,
) -> Result<Option<Value>, AdapterError> {
    let Some(id) = resource.remote_id.as_deref() else {
        return Ok(None);
    };
    match client
        .get_json(&format!("{collection}/{}", path_segment(id)))
        .await
    {
        Ok(resp) => Ok(resp.body),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err.into()),
    }
}
