//! Administrative operations: approve, reject, find, stats.

use serde::Serialize;
use tracing::info;

use super::flags::{set_standing, FlagSync};
use super::params::{parse_search, require_member};
use super::relay::relay_whitelist;
use crate::common::{MemberId, SteamId};
use crate::domains::whitelist::reconcile::{reconcile_member, ReconcileReport};
use crate::domains::whitelist::{
    FindResult, MutationReport, RoleFlag, StoreStats, WhitelistError, WhitelistStore,
};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ApprovalOutcome {
    Approved {
        member_id: MemberId,
        steam_id: SteamId,
        /// Steam ID the member was mapped to before, if it changed.
        previous: Option<SteamId>,
        flags: FlagSync,
        relayed_to: usize,
        persisted: bool,
    },
    /// The member already has a different Steam ID; resend with `overwrite`.
    NeedsConfirmation {
        member_id: MemberId,
        existing: SteamId,
        requested: SteamId,
    },
}

/// Approve `raw_member_id` with `raw_steam_id`.
///
/// Replacing an existing, different Steam ID requires `overwrite`.
pub async fn admin_whitelist(
    raw_member_id: &str,
    raw_steam_id: &str,
    overwrite: bool,
    deps: &ServerDeps,
) -> Result<ApprovalOutcome, WhitelistError> {
    let member_id = require_member(raw_member_id)?;
    let steam_id = SteamId::parse(raw_steam_id)?;

    enum Step {
        Confirm(SteamId),
        Done(MutationReport),
    }

    let policy = deps.steam_id_policy;
    let step = deps
        .store
        .write(|store: &mut WhitelistStore| {
            if let Some(existing) = store.steam_id_of(&member_id) {
                if existing != &steam_id && !overwrite {
                    return Ok(Step::Confirm(existing.clone()));
                }
            }
            policy.check(store, &member_id, &steam_id)?;
            Ok::<_, WhitelistError>(Step::Done(store.approve(&member_id, &steam_id)))
        })
        .await?;

    let report = match step {
        Step::Confirm(existing) => {
            info!(member_id = %member_id, existing = %existing, requested = %steam_id, "Approval needs overwrite confirmation");
            return Ok(ApprovalOutcome::NeedsConfirmation {
                member_id,
                existing,
                requested: steam_id,
            });
        }
        Step::Done(report) => report,
    };

    let flags = set_standing(&member_id, RoleFlag::Whitelisted, deps.roles.as_ref()).await;
    let relayed_to = relay_whitelist(&steam_id, deps.relay.as_ref()).await;

    let previous = report.change.previous.filter(|p| p != &steam_id);
    info!(
        member_id = %member_id,
        steam_id = %steam_id,
        replaced = previous.is_some(),
        "Admin approved whitelist"
    );

    Ok(ApprovalOutcome::Approved {
        member_id,
        steam_id,
        previous,
        flags,
        relayed_to,
        persisted: report.persisted,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectOutcome {
    pub member_id: MemberId,
    /// Steam ID that was on file before the rejection.
    pub steam_id: Option<SteamId>,
    pub flags: FlagSync,
    pub persisted: bool,
}

/// Reject a member named directly or through their Steam ID.
///
/// When both are given the member ID decides the target.
pub async fn admin_reject(
    raw_member_id: Option<&str>,
    raw_steam_id: Option<&str>,
    deps: &ServerDeps,
) -> Result<RejectOutcome, WhitelistError> {
    let (member_id, steam_id) = parse_search(raw_member_id, raw_steam_id)?;

    let (member_id, report) = deps
        .store
        .write(|store: &mut WhitelistStore| {
            let target = match (member_id, steam_id) {
                (Some(member_id), _) => member_id,
                (None, Some(steam_id)) => {
                    let mut owners = store.owners_of(&steam_id);
                    match owners.len() {
                        0 => return Err(WhitelistError::NotFound),
                        1 => owners.remove(0),
                        _ => return Err(WhitelistError::AmbiguousSteamId { steam_id, owners }),
                    }
                }
                (None, None) => return Err(WhitelistError::MissingSearchParameters),
            };

            if store.is_rejected(&target) {
                return Err(WhitelistError::AlreadyRejected);
            }
            let report = store.reject(&target);
            Ok((target, report))
        })
        .await?;

    let flags = set_standing(&member_id, RoleFlag::Rejected, deps.roles.as_ref()).await;

    info!(
        member_id = %member_id,
        steam_id = ?report.change.previous.as_ref().map(SteamId::as_str),
        "Admin rejected user"
    );

    Ok(RejectOutcome {
        member_id,
        steam_id: report.change.previous,
        flags,
        persisted: report.persisted,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FindResponse {
    #[serde(flatten)]
    pub result: FindResult,
    /// Set when the lookup resolved to a single member and their flags were checked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciled: Option<ReconcileReport>,
}

/// Look a member up and, when one member matches, restore a role flag they
/// lost since their status was stored.
pub async fn find_member(
    raw_member_id: Option<&str>,
    raw_steam_id: Option<&str>,
    deps: &ServerDeps,
) -> Result<FindResponse, WhitelistError> {
    let (member_id, steam_id) = parse_search(raw_member_id, raw_steam_id)?;

    let result = deps
        .store
        .read(|store| store.find(member_id.as_ref(), steam_id.as_ref()))
        .await?;

    let reconciled = match &result {
        FindResult::Member { user, .. } => {
            Some(reconcile_member(&user.member_id, &deps.store, deps.roles.as_ref()).await)
        }
        _ => None,
    };

    Ok(FindResponse { result, reconciled })
}

pub async fn stats(deps: &ServerDeps) -> StoreStats {
    deps.store.read(WhitelistStore::stats).await
}
