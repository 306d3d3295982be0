//! Convergence engine for SignalCraft resources.
//!
//! Declarative front ends persist desired state as [`ManagedResource`]
//! records; the [`Reconciler`] drives each record to confirmed remote state
//! through the per-kind adapters, with finalizer-guarded deletion,
//! deterministic idempotency keys, and fixed-delay retries.
//!
//! ```ignore
//! use signalcraft_config::SyncSettings;
//! use signalcraft_engine::{MemorySourceStore, Outcome, Reconciler};
//!
//! let store = MemorySourceStore::new();
//! let reconciler = Reconciler::from_settings(store, SyncSettings::from_env().ok().as_ref());
//! match reconciler.reconcile(&identity).await? {
//!     Outcome::Done => {}
//!     Outcome::Requeue(delay) => queue.requeue_after(identity, delay),
//! }
//! ```

pub mod memory;
pub mod projector;
pub mod reconciler;
pub mod store;

pub use memory::MemorySourceStore;
pub use projector::{project_failure, project_success};
pub use reconciler::{Outcome, ReconcileError, Reconciler};
pub use store::{SourceStore, StoreError};

pub use signalcraft_core::ManagedResource;
