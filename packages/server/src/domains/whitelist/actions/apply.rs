//! Self-service application: the member presses "apply", then submits a Steam ID.

use serde::Serialize;
use tracing::{info, warn};

use super::flags::{set_standing, FlagSync};
use super::params::require_member;
use super::relay::relay_whitelist;
use crate::common::{MemberId, SteamId};
use crate::domains::whitelist::reconcile::reconcile_with_flags;
use crate::domains::whitelist::{RoleFlag, RoleFlags, WhitelistError, WhitelistStore};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ApplyOutcome {
    AlreadyWhitelisted,
    Rejected,
    /// Steam ID on file without a status (older databases).
    AlreadyApplied { steam_id: SteamId },
    /// New applicant; the transport should ask for a Steam ID.
    NeedsSteamId,
    Submitted {
        steam_id: SteamId,
        flags: FlagSync,
        relayed_to: usize,
    },
}

/// Decide what a member pressing "apply" should see.
///
/// A flag the member already carries answers in-session, even when it
/// contradicts the store. A stored status answers when no flag is present,
/// and the missing flag is restored.
pub async fn apply(member_id: &MemberId, deps: &ServerDeps) -> ApplyOutcome {
    let (stored, mapped) = deps
        .store
        .read(|store| (store.stored_status(member_id), store.steam_id_of(member_id).cloned()))
        .await;

    let external = match deps.roles.flags(member_id).await {
        Ok(flags) => flags,
        Err(e) => {
            warn!(member_id = %member_id, error = %e, "Could not read role flags, using stored status only");
            None
        }
    };

    if let (Some(_), Some(flags)) = (stored, external) {
        reconcile_with_flags(member_id, stored, flags, deps.roles.as_ref()).await;
    }

    let in_session = external.as_ref().and_then(RoleFlags::status);
    if let Some(status) = in_session.or(stored) {
        return settled(status);
    }

    match mapped {
        Some(steam_id) => ApplyOutcome::AlreadyApplied { steam_id },
        None => ApplyOutcome::NeedsSteamId,
    }
}

fn settled(status: RoleFlag) -> ApplyOutcome {
    match status {
        RoleFlag::Whitelisted => ApplyOutcome::AlreadyWhitelisted,
        RoleFlag::Rejected => ApplyOutcome::Rejected,
    }
}

/// Handle a submitted Steam ID from the application form.
///
/// Members who already have a status (or a Steam ID on file) get the same
/// answer as [`apply`] and nothing is written, so the form cannot be used to
/// bypass a rejection.
pub async fn submit_steam_id(
    raw_member_id: &str,
    raw_steam_id: &str,
    deps: &ServerDeps,
) -> Result<ApplyOutcome, WhitelistError> {
    let member_id = require_member(raw_member_id)?;
    let steam_id = SteamId::parse(raw_steam_id)?;

    let gate = apply(&member_id, deps).await;
    if gate != ApplyOutcome::NeedsSteamId {
        return Ok(gate);
    }

    // The gate ran without the lock; an admin may have decided since.
    let policy = deps.steam_id_policy;
    let decided = deps
        .store
        .write(|store: &mut WhitelistStore| -> Result<Option<ApplyOutcome>, WhitelistError> {
            if let Some(status) = store.stored_status(&member_id) {
                return Ok(Some(settled(status)));
            }
            if let Some(on_file) = store.steam_id_of(&member_id) {
                return Ok(Some(ApplyOutcome::AlreadyApplied {
                    steam_id: on_file.clone(),
                }));
            }
            policy.check(store, &member_id, &steam_id)?;
            store.approve(&member_id, &steam_id);
            Ok(None)
        })
        .await?;

    if let Some(outcome) = decided {
        info!(member_id = %member_id, ?outcome, "Application settled while the form was open");
        return Ok(outcome);
    }

    let flags = set_standing(&member_id, RoleFlag::Whitelisted, deps.roles.as_ref()).await;
    let relayed_to = relay_whitelist(&steam_id, deps.relay.as_ref()).await;

    info!(member_id = %member_id, steam_id = %steam_id, "Whitelist application");

    Ok(ApplyOutcome::Submitted {
        steam_id,
        flags,
        relayed_to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SteamIdError;
    use crate::domains::whitelist::actions::admin::admin_reject;
    use crate::domains::whitelist::{SharedStore, SteamIdPolicy};
    use crate::kernel::test_dependencies::{MemorySink, MockRoleService, RoleCall, SpyCommandRelay};
    use crate::kernel::BaseRoleService;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    const S1: &str = "76561198000000001";

    struct Fixture {
        deps: ServerDeps,
        roles: MockRoleService,
        relay: SpyCommandRelay,
    }

    fn fixture(store: WhitelistStore, roles: MockRoleService, policy: SteamIdPolicy) -> Fixture {
        let relay = SpyCommandRelay::new(1);
        let deps = ServerDeps::new(
            SharedStore::new(store),
            Arc::new(roles.clone()),
            Arc::new(relay.clone()),
            policy,
        );
        Fixture { deps, roles, relay }
    }

    fn empty_store() -> WhitelistStore {
        WhitelistStore::empty(Arc::new(MemorySink::new()))
    }

    fn member(id: &str) -> MemberId {
        MemberId::parse(id).unwrap()
    }

    fn steam(raw: &str) -> SteamId {
        SteamId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn new_member_is_asked_for_steam_id() {
        let a = member("a");
        let f = fixture(
            empty_store(),
            MockRoleService::new().with_member(&a, RoleFlags::NONE),
            SteamIdPolicy::Shared,
        );

        assert_eq!(apply(&a, &f.deps).await, ApplyOutcome::NeedsSteamId);
        assert!(f.roles.calls().is_empty());
    }

    #[tokio::test]
    async fn rejoined_whitelisted_member_gets_role_back() {
        let a = member("a");
        let mut store = empty_store();
        store.approve(&a, &steam(S1));
        let f = fixture(
            store,
            MockRoleService::new().with_member(&a, RoleFlags::NONE),
            SteamIdPolicy::Shared,
        );

        assert_eq!(apply(&a, &f.deps).await, ApplyOutcome::AlreadyWhitelisted);
        assert_eq!(f.roles.calls(), vec![RoleCall::Add(a.clone(), RoleFlag::Whitelisted)]);
    }

    #[tokio::test]
    async fn rejoined_rejected_member_gets_role_back() {
        let a = member("a");
        let mut store = empty_store();
        store.reject(&a);
        let f = fixture(
            store,
            MockRoleService::new().with_member(&a, RoleFlags::NONE),
            SteamIdPolicy::Shared,
        );

        assert_eq!(apply(&a, &f.deps).await, ApplyOutcome::Rejected);
        assert_eq!(f.roles.calls(), vec![RoleCall::Add(a.clone(), RoleFlag::Rejected)]);
    }

    #[tokio::test]
    async fn external_flag_answers_when_nothing_is_stored() {
        let a = member("a");
        let f = fixture(
            empty_store(),
            MockRoleService::new().with_member(&a, RoleFlags::only(RoleFlag::Rejected)),
            SteamIdPolicy::Shared,
        );

        assert_eq!(apply(&a, &f.deps).await, ApplyOutcome::Rejected);
        assert!(f.roles.calls().is_empty());
    }

    #[tokio::test]
    async fn divergent_flag_answers_in_session_without_role_calls() {
        let a = member("a");
        let mut store = empty_store();
        store.reject(&a);
        let f = fixture(
            store,
            MockRoleService::new().with_member(&a, RoleFlags::only(RoleFlag::Whitelisted)),
            SteamIdPolicy::Shared,
        );

        assert_eq!(apply(&a, &f.deps).await, ApplyOutcome::AlreadyWhitelisted);
        assert!(f.roles.calls().is_empty());
        assert_eq!(f.roles.flags_of(&a), Some(RoleFlags::only(RoleFlag::Whitelisted)));
        assert!(f.deps.store.read(|s| s.is_rejected(&a)).await);
    }

    #[tokio::test]
    async fn role_lookup_failure_falls_back_to_store() {
        let a = member("a");
        let mut store = empty_store();
        store.approve(&a, &steam(S1));
        let f = fixture(store, MockRoleService::new().failing_reads(), SteamIdPolicy::Shared);

        assert_eq!(apply(&a, &f.deps).await, ApplyOutcome::AlreadyWhitelisted);
        assert!(f.roles.calls().is_empty());
    }

    #[tokio::test]
    async fn submit_approves_assigns_role_and_relays() {
        let a = member("a");
        let f = fixture(
            empty_store(),
            MockRoleService::new().with_member(&a, RoleFlags::NONE),
            SteamIdPolicy::Shared,
        );

        let outcome = submit_steam_id("a", &format!(" {S1} "), &f.deps).await.unwrap();

        assert_eq!(
            outcome,
            ApplyOutcome::Submitted {
                steam_id: steam(S1),
                flags: FlagSync::Applied,
                relayed_to: 1,
            }
        );
        assert!(f.deps.store.read(|s| s.is_approved(&a)).await);
        assert_eq!(f.roles.flags_of(&a), Some(RoleFlags::only(RoleFlag::Whitelisted)));
        assert_eq!(f.relay.commands(), vec![format!("!com wl.add {S1}")]);
    }

    #[tokio::test]
    async fn submit_rejects_malformed_steam_id_without_mutation() {
        let f = fixture(empty_store(), MockRoleService::new(), SteamIdPolicy::Shared);

        let err = submit_steam_id("a", "7656119800000000x", &f.deps).await.unwrap_err();

        assert_eq!(err, WhitelistError::InvalidSteamId(SteamIdError::NonDigit));
        assert_eq!(f.deps.store.read(|s| s.stats().total_users).await, 0);
        assert!(f.relay.commands().is_empty());
    }

    #[tokio::test]
    async fn submit_cannot_bypass_rejection() {
        let a = member("a");
        let mut store = empty_store();
        store.reject(&a);
        let f = fixture(
            store,
            MockRoleService::new().with_member(&a, RoleFlags::only(RoleFlag::Rejected)),
            SteamIdPolicy::Shared,
        );

        let outcome = submit_steam_id("a", S1, &f.deps).await.unwrap();

        assert_eq!(outcome, ApplyOutcome::Rejected);
        assert!(f.deps.store.read(|s| s.is_rejected(&a)).await);
        assert!(f.relay.commands().is_empty());
    }

    #[tokio::test]
    async fn shared_steam_ids_are_allowed_by_default() {
        let a = member("a");
        let b = member("b");
        let mut store = empty_store();
        store.approve(&a, &steam(S1));
        let f = fixture(
            store,
            MockRoleService::new().with_member(&b, RoleFlags::NONE),
            SteamIdPolicy::Shared,
        );

        submit_steam_id("b", S1, &f.deps).await.unwrap();

        let owners = f.deps.store.read(|s| s.owners_of(&steam(S1))).await;
        assert_eq!(owners, vec![a, b]);
    }

    #[tokio::test]
    async fn unique_policy_refuses_taken_steam_id() {
        let a = member("a");
        let b = member("b");
        let mut store = empty_store();
        store.approve(&a, &steam(S1));
        let f = fixture(
            store,
            MockRoleService::new().with_member(&b, RoleFlags::NONE),
            SteamIdPolicy::Unique,
        );

        let err = submit_steam_id("b", S1, &f.deps).await.unwrap_err();

        assert_eq!(err, WhitelistError::DuplicateSteamId(steam(S1)));
        assert!(!f.deps.store.read(|s| s.is_approved(&b)).await);
        assert!(f.roles.calls().is_empty());
    }

    /// Parks the first flag lookup until released, so a test can interleave
    /// an admin action with an open application form.
    struct ParkedLookup {
        inner: MockRoleService,
        parked: Arc<Notify>,
        release: Arc<Notify>,
        armed: AtomicBool,
    }

    #[async_trait]
    impl BaseRoleService for ParkedLookup {
        async fn flags(&self, member_id: &MemberId) -> Result<Option<RoleFlags>> {
            if self.armed.swap(false, Ordering::SeqCst) {
                self.parked.notify_one();
                self.release.notified().await;
            }
            self.inner.flags(member_id).await
        }

        async fn add_flag(&self, member_id: &MemberId, flag: RoleFlag) -> Result<()> {
            self.inner.add_flag(member_id, flag).await
        }

        async fn remove_flag(&self, member_id: &MemberId, flag: RoleFlag) -> Result<()> {
            self.inner.remove_flag(member_id, flag).await
        }
    }

    #[tokio::test]
    async fn rejection_during_open_form_is_not_undone() {
        let a = member("a");
        let parked = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        // Member is not in the guild, so only the store can gate the submission.
        let roles = ParkedLookup {
            inner: MockRoleService::new(),
            parked: parked.clone(),
            release: release.clone(),
            armed: AtomicBool::new(true),
        };
        let relay = SpyCommandRelay::new(1);
        let deps = ServerDeps::new(
            SharedStore::new(empty_store()),
            Arc::new(roles),
            Arc::new(relay.clone()),
            SteamIdPolicy::Shared,
        );

        let submission = {
            let deps = deps.clone();
            tokio::spawn(async move { submit_steam_id("a", S1, &deps).await })
        };

        parked.notified().await;
        admin_reject(Some("a"), None, &deps).await.unwrap();
        release.notify_one();

        let outcome = submission.await.unwrap().unwrap();

        assert_eq!(outcome, ApplyOutcome::Rejected);
        assert!(deps.store.read(|s| s.is_rejected(&a)).await);
        assert!(!deps.store.read(|s| s.is_approved(&a)).await);
        assert_eq!(deps.store.read(|s| s.steam_id_of(&a).cloned()).await, None);
        assert!(relay.commands().is_empty());
    }
}
