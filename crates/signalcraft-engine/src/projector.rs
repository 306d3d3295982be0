//! Projection of sync outcomes into persisted status records.
//!
//! Staleness stays observable: `observed_generation` advances only on a
//! confirmed successful sync and never decreases, so consumers can compare
//! it against the source's current generation at any time.

use signalcraft_core::{ObservedStatus, SyncState, SyncTime};

/// Status after a confirmed successful sync of `generation`.
pub fn project_success(
    prior: &ObservedStatus,
    generation: i64,
    message: impl Into<String>,
    now: SyncTime,
) -> ObservedStatus {
    ObservedStatus {
        state: SyncState::Synced,
        message: message.into(),
        observed_generation: prior.observed_generation.max(generation),
        last_synced_at: Some(now),
    }
}

/// Status after a failed sync attempt. The prior `observed_generation` is
/// carried forward unchanged.
pub fn project_failure(
    prior: &ObservedStatus,
    message: impl Into<String>,
    now: SyncTime,
) -> ObservedStatus {
    ObservedStatus {
        state: SyncState::Error,
        message: message.into(),
        observed_generation: prior.observed_generation,
        last_synced_at: Some(now),
    }
}
