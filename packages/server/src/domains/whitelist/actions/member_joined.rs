use tracing::debug;

use crate::common::MemberId;
use crate::domains::whitelist::reconcile::{reconcile_member, ReconcileReport};
use crate::kernel::ServerDeps;

/// A member (re)joined the guild: restore whatever flag the store says they hold.
pub async fn member_joined(member_id: &MemberId, deps: &ServerDeps) -> ReconcileReport {
    debug!(member_id = %member_id, "Member joined");
    reconcile_member(member_id, &deps.store, deps.roles.as_ref()).await
}
