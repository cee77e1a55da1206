//! Best-effort role flag updates after a store mutation.

use serde::Serialize;
use tracing::{info, warn};

use crate::common::MemberId;
use crate::domains::whitelist::RoleFlag;
use crate::kernel::BaseRoleService;

/// What happened to the member's role flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagSync {
    Applied,
    /// Not in the guild; reconciliation restores the flag when they rejoin.
    NotInGuild,
    Failed,
}

/// Give the member `flag` and take away its opposite.
pub async fn set_standing(
    member_id: &MemberId,
    flag: RoleFlag,
    roles: &dyn BaseRoleService,
) -> FlagSync {
    let current = match roles.flags(member_id).await {
        Ok(Some(flags)) => flags,
        Ok(None) => {
            info!(member_id = %member_id, "Member not in guild - roles will be applied when they rejoin");
            return FlagSync::NotInGuild;
        }
        Err(e) => {
            warn!(member_id = %member_id, error = %e, "Failed to read member roles");
            return FlagSync::Failed;
        }
    };

    let mut sync = FlagSync::Applied;
    if !current.has(flag) {
        if let Err(e) = roles.add_flag(member_id, flag).await {
            warn!(member_id = %member_id, %flag, error = %e, "Failed to assign role");
            sync = FlagSync::Failed;
        }
    }
    let opposite = flag.opposite();
    if current.has(opposite) {
        if let Err(e) = roles.remove_flag(member_id, opposite).await {
            warn!(member_id = %member_id, flag = %opposite, error = %e, "Failed to remove role");
            sync = FlagSync::Failed;
        }
    }

    if sync == FlagSync::Applied {
        info!(member_id = %member_id, %flag, "Managed roles");
    }
    sync
}
