//! Deterministic UUIDv5 identifiers for plans and actions.
//!
//! The UUID namespace is derived from a stable tag (`NS_TAG`) so that
//! `plan_id` and `action_id` are reproducible across runs for the same
//! serialized plan.
use std::fmt::Write;

use uuid::Uuid;

use crate::constants::NS_TAG;

use super::plan::{Action, ActionKind, InstallPlan};

fn namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, NS_TAG.as_bytes())
}

/// Serialize an action into a stable string used for UUIDv5 input.
fn serialize_action(a: &Action) -> String {
    let tag = match &a.kind {
        ActionKind::Install => "I",
        ActionKind::Symlink { .. } => "L",
        ActionKind::Directory => "D",
        ActionKind::Remove => "R",
        ActionKind::ConditionalRemove { .. } => "C",
        ActionKind::Expand => "X",
        ActionKind::Generate { .. } => "G",
        ActionKind::Touch => "T",
    };
    format!("{tag}:{}:{}", a.fileset, a.target.to_string_lossy())
}

/// Compute a deterministic UUIDv5 for a plan from its actions and services,
/// in declared order. Two identical plans share an ID.
#[must_use]
pub fn plan_id(plan: &InstallPlan) -> Uuid {
    let ns = namespace();
    let mut s = String::new();
    for a in &plan.actions {
        s.push_str(&serialize_action(a));
        s.push('\n');
    }
    for c in &plan.services {
        s.push_str(&c.service);
        s.push('\n');
    }
    Uuid::new_v5(&ns, s.as_bytes())
}

/// Deterministic UUIDv5 for an action as a function of the plan ID, the
/// action's serialized form, and its position.
#[must_use]
pub fn action_id(plan_id: &Uuid, action: &Action, idx: usize) -> Uuid {
    let mut s = serialize_action(action);
    let _ = write!(s, "#{idx}");
    Uuid::new_v5(plan_id, s.as_bytes())
}
