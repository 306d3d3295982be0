//! Per-kind bindings between managed resources and the SignalCraft REST
//! API, all implementing one [`ResourceAdapter`] surface so the reconciler
//! drives a single state machine for every kind.

pub mod adapter;
mod alert_policy;
mod escalation_policy;
mod id_crud;
mod invitation;
mod payload;
mod routing_rule;
mod schedule;
mod team;
mod user;
mod workspace;

pub use adapter::{AdapterError, CreateOutcome, ResourceAdapter};
pub use alert_policy::AlertPolicyAdapter;
pub use escalation_policy::EscalationPolicyAdapter;
pub use invitation::InvitationAdapter;
pub use routing_rule::RoutingRuleAdapter;
pub use schedule::ScheduleAdapter;
pub use team::TeamAdapter;
pub use user::UserAdapter;
pub use workspace::WorkspaceAdapter;

use signalcraft_core::ResourceKind;

/// The adapter for a resource kind.
pub fn adapter_for(kind: ResourceKind) -> &'static dyn ResourceAdapter {
    match kind {
        ResourceKind::AlertPolicy => &AlertPolicyAdapter,
        ResourceKind::EscalationPolicy => &EscalationPolicyAdapter,
        ResourceKind::RoutingRule => &RoutingRuleAdapter,
        ResourceKind::Schedule => &ScheduleAdapter,
        ResourceKind::Team => &TeamAdapter,
        ResourceKind::Invitation => &InvitationAdapter,
        ResourceKind::User => &UserAdapter,
        ResourceKind::Workspace => &WorkspaceAdapter,
    }
}
