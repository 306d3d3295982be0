//! The seam to the desired-state source.
//!
//! Front ends (a cluster control plane, a plan applier) persist managed
//! resources and deliver reconcile triggers; the engine only ever touches
//! them through this trait. All writes are conditional on the record's
//! last-observed version so that concurrently triggered passes cannot lose
//! updates: the loser of a compare-and-swap race abandons its write.

use async_trait::async_trait;
use thiserror::Error;

use signalcraft_core::{ManagedResource, ObservedStatus, ResourceIdentity};

/// Error types for source-store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Resource not found: {0}")]
    NotFound(ResourceIdentity),

    #[error("Version conflict for {identity}: expected {expected}, found {found}")]
    Conflict {
        identity: ResourceIdentity,
        expected: u64,
        found: u64,
    },

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// A lost CAS race: a newer pass already wrote this record.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// The write no longer applies: the version moved on, or the record was
    /// removed outright by a concurrent pass. Either way the current pass
    /// abandons its write.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::NotFound(_))
    }
}

/// Persistence operations the engine needs from a desired-state source.
///
/// Implementations must be thread-safe (`Send + Sync`). Watch-or-poll
/// delivery of reconcile triggers is the front end's concern and is not
/// part of this contract.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Current persisted record, or `None` when the source no longer
    /// reports the identity.
    async fn get(&self, identity: &ResourceIdentity)
    -> Result<Option<ManagedResource>, StoreError>;

    /// All identities the source currently reports.
    async fn list(&self) -> Result<Vec<ResourceIdentity>, StoreError>;

    /// Persist metadata (finalizer marker, remote id) conditionally on
    /// `resource.resource_version`, returning the stored record with its
    /// new version.
    ///
    /// Clearing the finalizer on a record with deletion requested makes the
    /// record eligible for removal by the source.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` when the persisted version moved on.
    async fn update_metadata(
        &self,
        resource: &ManagedResource,
    ) -> Result<ManagedResource, StoreError>;

    /// Persist a status record conditionally on `expected_version`,
    /// returning the new version.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` when the persisted version moved on.
    async fn update_status(
        &self,
        identity: &ResourceIdentity,
        status: &ObservedStatus,
        expected_version: u64,
    ) -> Result<u64, StoreError>;
}

#[async_trait]
impl<S: SourceStore + ?Sized> SourceStore for std::sync::Arc<S> {
    async fn get(
        &self,
        identity: &ResourceIdentity,
    ) -> Result<Option<ManagedResource>, StoreError> {
        (**self).get(identity).await
    }

    async fn list(&self) -> Result<Vec<ResourceIdentity>, StoreError> {
        (**self).list().await
    }

    async fn update_metadata(
        &self,
        resource: &ManagedResource,
    ) -> Result<ManagedResource, StoreError> {
        (**self).update_metadata(resource).await
    }

    async fn update_status(
        &self,
        identity: &ResourceIdentity,
        status: &ObservedStatus,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        (**self).update_status(identity, status, expected_version).await
    }
}
