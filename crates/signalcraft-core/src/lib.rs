pub mod diff;
pub mod error;
pub mod idempotency;
pub mod identity;
pub mod resource;
pub mod time;

pub use diff::{MemberDelta, diff};
pub use error::{CoreError, ErrorCategory, Result};
pub use idempotency::{IdempotencyKey, Operation};
pub use identity::ResourceIdentity;
pub use resource::{LifecyclePhase, ManagedResource, ObservedStatus, ResourceKind, SyncState};
pub use time::{SyncTime, now_utc};
