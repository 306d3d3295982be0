//! In-memory source store for tests and embedding.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use signalcraft_core::{ManagedResource, ObservedStatus, ResourceIdentity};

use crate::store::{SourceStore, StoreError};

/// Versioned per-identity records behind an async lock. Every write bumps
/// `resource_version`; conditional writes enforce the CAS contract.
#[derive(Default)]
pub struct MemorySourceStore {
    records: RwLock<BTreeMap<ResourceIdentity, ManagedResource>>,
}

impl MemorySourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record the way a front end reports a new object.
    pub async fn insert(&self, resource: ManagedResource) {
        let mut records = self.records.write().await;
        records.insert(resource.identity.clone(), resource);
    }

    /// Replace the desired spec of an existing record, bumping its
    /// generation the way the source does on every edit.
    pub async fn edit_spec(
        &self,
        identity: &ResourceIdentity,
        spec: Value,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(identity)
            .ok_or_else(|| StoreError::NotFound(identity.clone()))?;
        record.edit_spec(spec);
        record.resource_version += 1;
        Ok(())
    }

    /// Mark a record for deletion; the record stays until its finalizer is
    /// cleared.
    pub async fn request_deletion(&self, identity: &ResourceIdentity) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(identity)
            .ok_or_else(|| StoreError::NotFound(identity.clone()))?;
        record.request_deletion();
        record.resource_version += 1;
        Ok(())
    }

    pub async fn contains(&self, identity: &ResourceIdentity) -> bool {
        self.records.read().await.contains_key(identity)
    }
}

#[async_trait]
impl SourceStore for MemorySourceStore {
    async fn get(
        &self,
        identity: &ResourceIdentity,
    ) -> Result<Option<ManagedResource>, StoreError> {
        Ok(self.records.read().await.get(identity).cloned())
    }

    async fn list(&self) -> Result<Vec<ResourceIdentity>, StoreError> {
        Ok(self.records.read().await.keys().cloned().collect())
    }

    async fn update_metadata(
        &self,
        resource: &ManagedResource,
    ) -> Result<ManagedResource, StoreError> {
        let mut records = self.records.write().await;
        let current = records
            .get(&resource.identity)
            .ok_or_else(|| StoreError::NotFound(resource.identity.clone()))?;
        if current.resource_version != resource.resource_version {
            return Err(StoreError::Conflict {
                identity: resource.identity.clone(),
                expected: resource.resource_version,
                found: current.resource_version,
            });
        }

        let mut stored = resource.clone();
        stored.resource_version += 1;

        // With deletion requested and no finalizer left, nothing blocks
        // removal: the source drops the record.
        if stored.deletion_requested && !stored.finalizer_attached {
            records.remove(&resource.identity);
        } else {
            records.insert(resource.identity.clone(), stored.clone());
        }
        Ok(stored)
    }

    async fn update_status(
        &self,
        identity: &ResourceIdentity,
        status: &ObservedStatus,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(identity)
            .ok_or_else(|| StoreError::NotFound(identity.clone()))?;
        if record.resource_version != expected_version {
            return Err(StoreError::Conflict {
                identity: identity.clone(),
                expected: expected_version,
                found: record.resource_version,
            });
        }
        record.status = status.clone();
        record.resource_version += 1;
        Ok(record.resource_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use signalcraft_core::{ResourceKind, SyncState};

    fn schedule() -> ManagedResource {
        ManagedResource::new(
            ResourceIdentity::new("prod", "primary").unwrap(),
            ResourceKind::Schedule,
            json!({"name": "primary", "timezone": "UTC"}),
        )
    }

    #[tokio::test]
    async fn test_update_metadata_bumps_version() {
        let store = MemorySourceStore::new();
        store.insert(schedule()).await;

        let mut res = store.get(&schedule().identity).await.unwrap().unwrap();
        res.finalizer_attached = true;
        let stored = store.update_metadata(&res).await.unwrap();
        assert_eq!(stored.resource_version, res.resource_version + 1);
        assert!(stored.finalizer_attached);
    }

    #[tokio::test]
    async fn test_stale_writes_conflict() {
        let store = MemorySourceStore::new();
        store.insert(schedule()).await;
        let identity = schedule().identity;

        let stale = store.get(&identity).await.unwrap().unwrap();
        store.edit_spec(&identity, json!({"name": "primary"})).await.unwrap();

        let err = store.update_metadata(&stale).await.unwrap_err();
        assert!(err.is_conflict());

        let status = ObservedStatus {
            state: SyncState::Synced,
            ..Default::default()
        };
        let err = store
            .update_status(&identity, &status, stale.resource_version)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_clearing_finalizer_removes_deleted_record() {
        let store = MemorySourceStore::new();
        let mut res = schedule();
        res.finalizer_attached = true;
        let identity = res.identity.clone();
        store.insert(res).await;
        store.request_deletion(&identity).await.unwrap();

        let mut current = store.get(&identity).await.unwrap().unwrap();
        current.finalizer_attached = false;
        store.update_metadata(&current).await.unwrap();

        assert!(!store.contains(&identity).await);
    }
}
