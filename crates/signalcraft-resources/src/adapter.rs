//! The generic CRUD surface every resource kind implements.
//!
//! The reconciler drives one state machine for all kinds; what varies per
//! kind is the path template, the payload codec, and an optional diffable
//! membership sub-collection. Each adapter owns exactly that variation.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use signalcraft_client::{ApiClient, ApiError};
use signalcraft_core::{CoreError, ManagedResource, ResourceKind};

/// Result of a create-type call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOutcome {
    /// Remote correlation id learned from the call, when the kind has one.
    pub remote_id: Option<String>,
}

impl CreateOutcome {
    pub fn with_remote_id(remote_id: impl Into<String>) -> Self {
        Self {
            remote_id: Some(remote_id.into()),
        }
    }
}

/// Failures surfaced by an adapter operation.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Updating {kind} resources is not supported; recreate instead")]
    UnsupportedUpdate { kind: ResourceKind },

    #[error("{kind} resource has no remote id yet")]
    MissingRemoteId { kind: ResourceKind },
}

impl AdapterError {
    /// True when the remote object is already gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(err) if err.is_not_found())
    }

    /// True for errors that cannot self-heal through retries alone
    /// (malformed spec, unsupported operation).
    pub fn is_blocking(&self) -> bool {
        match self {
            Self::Core(err) => err.is_spec_error(),
            Self::UnsupportedUpdate { .. } => true,
            _ => false,
        }
    }
}

/// One resource kind's binding to the remote API.
///
/// Implementations are stateless; all persisted bookkeeping lives on the
/// [`ManagedResource`] and all side effects go through the supplied client.
///
/// # Errors
///
/// Methods return `AdapterError::Api` for classified remote outcomes and
/// `AdapterError::Core` for spec-extraction failures. The 404-on-delete
/// success rule is applied by the reconciler, not here.
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    fn kind(&self) -> ResourceKind;

    /// Create the remote counterpart, applying the full desired state
    /// (membership kinds apply the complete desired member set).
    async fn create(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<CreateOutcome, AdapterError>;

    /// Converge an existing remote counterpart toward the desired spec
    /// (membership kinds apply a set diff rather than wholesale
    /// replacement).
    async fn update(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<(), AdapterError>;

    /// Issue the remote delete. Kinds without a remote counterpart to
    /// remove return `Ok(())`.
    async fn delete(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<(), AdapterError>;

    /// Read the remote counterpart; `Ok(None)` when the kind has no read
    /// surface or the object is not in the listing.
    async fn read(
        &self,
        client: &ApiClient,
        resource: &ManagedResource,
    ) -> Result<Option<Value>, AdapterError>;
}

/// Remote id of an id-correlated resource, or the kind-appropriate error.
pub(crate) fn require_remote_id<'a>(
    resource: &'a ManagedResource,
    kind: ResourceKind,
) -> Result<&'a str, AdapterError> {
    resource
        .remote_id
        .as_deref()
        .ok_or(AdapterError::MissingRemoteId { kind })
}
