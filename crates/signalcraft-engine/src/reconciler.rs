//! The CRUD lifecycle controller.
//!
//! Each pass re-derives everything it needs from the persisted record, so a
//! pass is safe to re-run from scratch after a crash at any point. The
//! ordering guarantees live here:
//!
//! - the finalizer is attached and persisted before the first remote
//!   create/update, and is only removed after a remote delete succeeded or
//!   the object was confirmed already absent;
//! - remote failures never escape as process faults; they become a
//!   persisted `Error` status plus a fixed-delay requeue;
//! - status writes are conditional on the record version read at the start
//!   of the pass, so a pass superseded by a newer one abandons its write.

use std::time::Duration;

use thiserror::Error;

use signalcraft_client::ApiClient;
use signalcraft_config::SyncSettings;
use signalcraft_core::{LifecyclePhase, ManagedResource, ResourceIdentity, now_utc};
use signalcraft_resources::{AdapterError, adapter_for};

use crate::projector::{project_failure, project_success};
use crate::store::{SourceStore, StoreError};

const SYNCED_MESSAGE: &str = "Synced to SignalCraft";
const MISSING_CONFIG_MESSAGE: &str = "Missing SIGNALCRAFT_API_URL or SIGNALCRAFT_API_KEY";

const DEFAULT_REQUEUE_DELAY: Duration = Duration::from_secs(60);

/// What the caller's work queue should do after a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Requeue(Duration),
}

/// Failures that escape a reconciliation pass. Only source-store
/// persistence failures do; remote failures are absorbed into status.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Drives managed resources from desired spec to confirmed remote state.
pub struct Reconciler<S> {
    store: S,
    client: Option<ApiClient>,
    requeue_delay: Duration,
}

impl<S: SourceStore> Reconciler<S> {
    /// A reconciler with an already-built client. `None` means the engine
    /// runs unconfigured: every pass projects a configuration error and
    /// requeues instead of calling out.
    pub fn new(store: S, client: Option<ApiClient>) -> Self {
        Self {
            store,
            client,
            requeue_delay: DEFAULT_REQUEUE_DELAY,
        }
    }

    /// A reconciler from settings resolved at startup. Settings are
    /// validated here, once; nothing is re-read during a pass.
    pub fn from_settings(store: S, settings: Option<&SyncSettings>) -> Self {
        let client = settings.and_then(|s| ApiClient::new(s).ok());
        let requeue_delay = settings
            .map(|s| s.requeue_delay)
            .unwrap_or(DEFAULT_REQUEUE_DELAY);
        Self {
            store,
            client,
            requeue_delay,
        }
    }

    #[must_use]
    pub fn with_requeue_delay(mut self, delay: Duration) -> Self {
        self.requeue_delay = delay;
        self
    }

    /// Run one pass for `identity`.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Store` only when the desired-state source
    /// itself failed to persist metadata or status; the caller's own retry
    /// machinery owns that case.
    pub async fn reconcile(&self, identity: &ResourceIdentity) -> Result<Outcome, ReconcileError> {
        let Some(resource) = self.store.get(identity).await? else {
            tracing::debug!(identity = %identity, "resource gone from source, nothing to do");
            return Ok(Outcome::Done);
        };

        tracing::info!(
            identity = %identity,
            kind = %resource.kind,
            generation = resource.generation,
            phase = ?resource.phase(),
            "reconciling"
        );

        if resource.deletion_requested {
            return self.reconcile_deletion(resource).await;
        }
        self.reconcile_upsert(resource).await
    }

    /// Run one pass for every identity the source reports, for poll-style
    /// front ends. Identities requeue independently.
    pub async fn reconcile_all(&self) -> Result<Vec<(ResourceIdentity, Outcome)>, ReconcileError> {
        let mut outcomes = Vec::new();
        for identity in self.store.list().await? {
            let outcome = self.reconcile(&identity).await?;
            outcomes.push((identity, outcome));
        }
        Ok(outcomes)
    }

    async fn reconcile_deletion(
        &self,
        mut resource: ManagedResource,
    ) -> Result<Outcome, ReconcileError> {
        if !resource.finalizer_attached {
            // No remote cleanup owed; the source is free to drop the record.
            return Ok(Outcome::Done);
        }

        let Some(client) = &self.client else {
            return self.fail(&resource, MISSING_CONFIG_MESSAGE).await;
        };

        let adapter = adapter_for(resource.kind);
        match adapter.delete(client, &resource).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                tracing::debug!(identity = %resource.identity, "remote object already absent");
            }
            Err(err) => {
                tracing::warn!(identity = %resource.identity, error = %err, "remote delete failed");
                // The finalizer stays attached: the delete will be
                // attempted again on the next pass.
                return self.fail(&resource, err.to_string()).await;
            }
        }

        resource.finalizer_attached = false;
        match self.store.update_metadata(&resource).await {
            Ok(_) => Ok(Outcome::Done),
            Err(err) if err.is_stale() => {
                tracing::debug!(identity = %resource.identity, "superseded by a newer pass");
                Ok(Outcome::Done)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn reconcile_upsert(
        &self,
        mut resource: ManagedResource,
    ) -> Result<Outcome, ReconcileError> {
        if !resource.finalizer_attached {
            resource.finalizer_attached = true;
            match self.store.update_metadata(&resource).await {
                Ok(stored) => resource = stored,
                Err(err) if err.is_stale() => {
                    tracing::debug!(identity = %resource.identity, "superseded by a newer pass");
                    return Ok(Outcome::Done);
                }
                Err(err) => return Err(err.into()),
            }
        }

        let Some(client) = &self.client else {
            return self.fail(&resource, MISSING_CONFIG_MESSAGE).await;
        };

        let adapter = adapter_for(resource.kind);
        let result = match resource.phase() {
            LifecyclePhase::Creating => adapter
                .create(client, &resource)
                .await
                .map(|outcome| outcome.remote_id),
            LifecyclePhase::Updating => adapter.update(client, &resource).await.map(|_| None),
            LifecyclePhase::Settled => {
                tracing::debug!(identity = %resource.identity, "already converged");
                return Ok(Outcome::Done);
            }
            // Deletion is dispatched before this point.
            LifecyclePhase::Deleting => return Ok(Outcome::Done),
        };

        match result {
            Ok(learned_remote_id) => {
                if let Some(remote_id) = learned_remote_id {
                    if resource.remote_id.as_deref() != Some(remote_id.as_str()) {
                        resource.remote_id = Some(remote_id);
                        match self.store.update_metadata(&resource).await {
                            Ok(stored) => resource = stored,
                            Err(err) if err.is_stale() => {
                                tracing::debug!(
                                    identity = %resource.identity,
                                    "superseded by a newer pass"
                                );
                                return Ok(Outcome::Done);
                            }
                            Err(err) => return Err(err.into()),
                        }
                    }
                }

                let status = project_success(
                    &resource.status,
                    resource.generation,
                    SYNCED_MESSAGE,
                    now_utc(),
                );
                match self
                    .store
                    .update_status(&resource.identity, &status, resource.resource_version)
                    .await
                {
                    Ok(_) => Ok(Outcome::Done),
                    Err(err) if err.is_stale() => {
                        tracing::debug!(identity = %resource.identity, "superseded by a newer pass");
                        Ok(Outcome::Done)
                    }
                    Err(err) => Err(err.into()),
                }
            }
            Err(err) => {
                if matches!(err, AdapterError::Core(_) | AdapterError::UnsupportedUpdate { .. }) {
                    tracing::warn!(
                        identity = %resource.identity,
                        error = %err,
                        "desired spec cannot be synced without a correction"
                    );
                } else {
                    tracing::warn!(identity = %resource.identity, error = %err, "remote sync failed");
                }
                self.fail(&resource, err.to_string()).await
            }
        }
    }

    /// Project a failure status and schedule the fixed-delay retry. A lost
    /// CAS race means a newer pass owns the record; its own outcome stands.
    async fn fail(
        &self,
        resource: &ManagedResource,
        message: impl Into<String>,
    ) -> Result<Outcome, ReconcileError> {
        let status = project_failure(&resource.status, message, now_utc());
        match self
            .store
            .update_status(&resource.identity, &status, resource.resource_version)
            .await
        {
            Ok(_) => Ok(Outcome::Requeue(self.requeue_delay)),
            Err(err) if err.is_stale() => {
                tracing::debug!(identity = %resource.identity, "superseded by a newer pass");
                Ok(Outcome::Done)
            }
            Err(err) => Err(err.into()),
        }
    }
}
