//! Rejoin reconciliation: restore a member's role flags from the store.
//!
//! Role flags do not survive a member leaving and rejoining the guild, but
//! the store does. When a member with a stored status carries no flag at all,
//! the stored flag is restored. A flag that contradicts the store is left in
//! place and logged; in-session checks treat it as authoritative.
//!
//! Flag calls are best-effort. Failures are logged and reported, never
//! propagated, and never roll back the store.

use serde::Serialize;
use tracing::{info, warn};

use super::models::{RoleFlag, RoleFlags, SharedStore};
use crate::common::MemberId;
use crate::kernel::BaseRoleService;

/// Flag changes needed to bring the external flags in line with the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Reconciliation {
    NoAction,
    /// Stored status has no flag at all (typical rejoin).
    Restore { flag: RoleFlag },
}

/// Decide which flag changes bring `external` in line with `stored`.
///
/// Only an empty flag set is restored. Any flag already present, matching
/// or not, means no action.
pub fn plan(stored: Option<RoleFlag>, external: RoleFlags) -> Reconciliation {
    match stored {
        Some(flag) if external.is_empty() => Reconciliation::Restore { flag },
        _ => Reconciliation::NoAction,
    }
}

/// True when the member carries the flag opposite to their stored status
/// and not the stored one.
pub fn diverges(stored: Option<RoleFlag>, external: RoleFlags) -> bool {
    stored.is_some_and(|flag| !external.has(flag) && external.has(flag.opposite()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub stored: Option<RoleFlag>,
    /// Flags seen in the guild; `None` if not fetched or not a guild member.
    pub external: Option<RoleFlags>,
    pub plan: Reconciliation,
    /// True when every planned flag call succeeded.
    pub applied: bool,
}

impl ReconcileReport {
    fn skipped(stored: Option<RoleFlag>) -> Self {
        Self {
            stored,
            external: None,
            plan: Reconciliation::NoAction,
            applied: true,
        }
    }
}

/// Reconcile one member: read their stored status, fetch their flags, and
/// apply whatever `plan` decides.
pub async fn reconcile_member(
    member_id: &MemberId,
    store: &SharedStore,
    roles: &dyn BaseRoleService,
) -> ReconcileReport {
    let stored = store.read(|s| s.stored_status(member_id)).await;
    if stored.is_none() {
        return ReconcileReport::skipped(stored);
    }

    let external = match roles.flags(member_id).await {
        Ok(Some(flags)) => flags,
        Ok(None) => {
            info!(member_id = %member_id, "Member not in guild, flags will be restored when they rejoin");
            return ReconcileReport::skipped(stored);
        }
        Err(e) => {
            warn!(member_id = %member_id, error = %e, "Could not read role flags for reconciliation");
            return ReconcileReport {
                applied: false,
                ..ReconcileReport::skipped(stored)
            };
        }
    };

    reconcile_with_flags(member_id, stored, external, roles).await
}

/// Same as [`reconcile_member`] when the caller already holds both sides.
pub async fn reconcile_with_flags(
    member_id: &MemberId,
    stored: Option<RoleFlag>,
    external: RoleFlags,
    roles: &dyn BaseRoleService,
) -> ReconcileReport {
    if diverges(stored, external) {
        warn!(
            member_id = %member_id,
            stored = ?stored,
            external = ?external.status(),
            "Role flag contradicts stored status, leaving it in place"
        );
    }

    let plan = plan(stored, external);
    let applied = apply_plan(member_id, plan, roles).await;
    ReconcileReport {
        stored,
        external: Some(external),
        plan,
        applied,
    }
}

async fn apply_plan(
    member_id: &MemberId,
    plan: Reconciliation,
    roles: &dyn BaseRoleService,
) -> bool {
    let Reconciliation::Restore { flag } = plan else {
        return true;
    };

    match roles.add_flag(member_id, flag).await {
        Ok(()) => {
            info!(member_id = %member_id, %flag, "Re-assigned role from stored status");
            true
        }
        Err(e) => {
            warn!(member_id = %member_id, %flag, error = %e, "Failed to re-assign role");
            false
        }
    }
}
