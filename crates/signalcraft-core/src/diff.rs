//! Set diffing for membership-style sub-collections.
//!
//! Converges a remote membership collection toward a desired set with
//! minimal add/remove operations instead of wholesale replacement. Deltas
//! are commutative: applying adds and removes in any order reaches the same
//! end state, and diffing a converged state yields two empty sets.

use std::collections::BTreeSet;

/// Minimal operations aligning a current membership set with a desired one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberDelta {
    pub to_add: BTreeSet<String>,
    pub to_remove: BTreeSet<String>,
}

impl MemberDelta {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// `to_add = desired − current`, `to_remove = current − desired`.
pub fn diff(current: &BTreeSet<String>, desired: &BTreeSet<String>) -> MemberDelta {
    MemberDelta {
        to_add: desired.difference(current).cloned().collect(),
        to_remove: current.difference(desired).cloned().collect(),
    }
}
