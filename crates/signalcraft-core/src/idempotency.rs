//! Idempotency keys for mutating remote calls.
//!
//! Every mutating call carries a key that is a deterministic function of
//! (uid, generation, operation). Retries of the same logical operation
//! therefore present the same key and deduplicate remotely; a new generation
//! or a different operation gets a fresh key.

use std::fmt;
use uuid::Uuid;

/// The logical operation a mutating call performs. Delete keys are
/// namespaced apart from upsert keys for the same generation, and each
/// membership mutation keys independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Upsert,
    Delete,
    MemberAdd(String),
    MemberRemove(String),
}

/// Deterministic idempotency token for one logical mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn derive(uid: Uuid, generation: i64, op: &Operation) -> Self {
        let key = match op {
            Operation::Upsert => format!("{uid}-{generation}"),
            Operation::Delete => format!("{uid}-{generation}-delete"),
            Operation::MemberAdd(member) => {
                format!("{uid}-{generation}-member-add-{member}")
            }
            Operation::MemberRemove(member) => {
                format!("{uid}-{generation}-member-remove-{member}")
            }
        };
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
