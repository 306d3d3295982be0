use crate::error::{CoreError, Result};
use crate::identity::ResourceIdentity;
use crate::time::SyncTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The eight SignalCraft resource kinds the engine converges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    AlertPolicy,
    EscalationPolicy,
    RoutingRule,
    Schedule,
    Team,
    Invitation,
    User,
    Workspace,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlertPolicy => "alert-policy",
            Self::EscalationPolicy => "escalation-policy",
            Self::RoutingRule => "routing-rule",
            Self::Schedule => "schedule",
            Self::Team => "team",
            Self::Invitation => "invitation",
            Self::User => "user",
            Self::Workspace => "workspace",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "alert-policy" => Ok(Self::AlertPolicy),
            "escalation-policy" => Ok(Self::EscalationPolicy),
            "routing-rule" => Ok(Self::RoutingRule),
            "schedule" => Ok(Self::Schedule),
            "team" => Ok(Self::Team),
            "invitation" => Ok(Self::Invitation),
            "user" => Ok(Self::User),
            "workspace" => Ok(Self::Workspace),
            other => Err(CoreError::invalid_kind(other)),
        }
    }
}

/// Sync state as observed by consumers of the status record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SyncState {
    #[default]
    Pending,
    Creating,
    Updating,
    Deleting,
    Synced,
    Error,
    Absent,
}

/// Lifecycle phase a reconciliation pass is about to drive the resource
/// through, derived purely from persisted fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Creating,
    Updating,
    Deleting,
    Settled,
}

/// Last confirmed or attempted outcome of realizing desired state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedStatus {
    pub state: SyncState,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "observedGeneration", default)]
    pub observed_generation: i64,
    #[serde(rename = "lastSyncedAt", skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<SyncTime>,
}

impl Default for ObservedStatus {
    fn default() -> Self {
        Self {
            state: SyncState::Pending,
            message: String::new(),
            observed_generation: 0,
            last_synced_at: None,
        }
    }
}

/// The unit the engine converges: a desired spec plus the persisted
/// bookkeeping needed to drive it to confirmed remote state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedResource {
    pub identity: ResourceIdentity,
    pub uid: Uuid,
    pub kind: ResourceKind,
    pub generation: i64,
    /// CAS token for metadata/status writes against the source store.
    #[serde(rename = "resourceVersion")]
    pub resource_version: u64,
    /// Remote correlation id; None until the first successful create.
    #[serde(rename = "remoteId", skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    #[serde(rename = "deletionRequested", default)]
    pub deletion_requested: bool,
    #[serde(rename = "finalizerAttached", default)]
    pub finalizer_attached: bool,
    /// Opaque desired spec; nested condition/rule/action trees pass through
    /// encode/decode untouched.
    pub spec: Value,
    #[serde(default)]
    pub status: ObservedStatus,
}

impl ManagedResource {
    pub fn new(identity: ResourceIdentity, kind: ResourceKind, spec: Value) -> Self {
        Self {
            identity,
            uid: Uuid::new_v4(),
            kind,
            generation: 1,
            resource_version: 0,
            remote_id: None,
            deletion_requested: false,
            finalizer_attached: false,
            spec,
            status: ObservedStatus::default(),
        }
    }

    /// Replace the desired spec, bumping the generation counter the way the
    /// desired-state source does on every edit.
    pub fn edit_spec(&mut self, spec: Value) {
        self.spec = spec;
        self.generation += 1;
    }

    pub fn request_deletion(&mut self) {
        self.deletion_requested = true;
    }

    /// The phase the next reconciliation pass will drive, derived from
    /// persisted fields only.
    pub fn phase(&self) -> LifecyclePhase {
        if self.deletion_requested {
            if self.finalizer_attached {
                LifecyclePhase::Deleting
            } else {
                LifecyclePhase::Settled
            }
        } else if self.remote_id.is_none() {
            LifecyclePhase::Creating
        } else if self.status.state == SyncState::Synced
            && self.status.observed_generation == self.generation
        {
            LifecyclePhase::Settled
        } else {
            LifecyclePhase::Updating
        }
    }

    /// A spec field by key, for adapters extracting well-known fields from
    /// the opaque tree.
    pub fn spec_field(&self, key: &str) -> Option<&Value> {
        self.spec.get(key)
    }

    /// A required string-valued spec field.
    pub fn spec_str(&self, key: &str) -> Result<&str> {
        self.spec_field(key)
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::invalid_spec(format!("missing string field '{key}'")))
    }
}
