//! In-memory whitelist state and the one routine that mutates it.
//!
//! `StoreState::apply` is the only place that touches the member→Steam ID
//! mapping together with the derived views (Steam ID index, whitelisted set,
//! rejected set). Every mutation on the store goes through it, so the
//! following always hold afterwards:
//!
//! 1. a member is in at most one of the whitelisted / rejected sets;
//! 2. a Steam ID is indexed iff at least one member maps to it;
//! 3. approving clears rejection, rejecting clears approval and the mapping;
//! 4. re-approving with a new Steam ID overwrites only that member's mapping
//!    and prunes the old Steam ID when nobody else owns it.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use super::snapshot::Snapshot;
use crate::common::{MemberId, SteamId};

/// A change requested against the store.
#[derive(Debug, Clone, Copy)]
pub enum Mutation<'a> {
    Approve {
        member_id: &'a MemberId,
        steam_id: &'a SteamId,
    },
    Reject {
        member_id: &'a MemberId,
    },
}

/// What a mutation did to the mapping and the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexChange {
    /// Steam ID the member was mapped to before the mutation.
    pub previous: Option<SteamId>,
    /// Steam ID dropped from the index because its last owner went away.
    pub pruned: Option<SteamId>,
}

/// Problems found (and fixed) while building state from a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repairs {
    pub invalid_entries: usize,
    pub orphaned_steam_ids: usize,
    pub unindexed_steam_ids: usize,
    pub conflicting_statuses: usize,
}

impl Repairs {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    users: BTreeMap<MemberId, SteamId>,
    steam_ids: BTreeSet<SteamId>,
    whitelisted: BTreeSet<MemberId>,
    rejected: BTreeSet<MemberId>,
}

impl StoreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a mutation, keeping the mapping and all derived views in step.
    pub fn apply(&mut self, mutation: Mutation<'_>) -> IndexChange {
        let change = match mutation {
            Mutation::Approve {
                member_id,
                steam_id,
            } => {
                let previous = self.users.insert(member_id.clone(), steam_id.clone());
                self.steam_ids.insert(steam_id.clone());
                self.whitelisted.insert(member_id.clone());
                self.rejected.remove(member_id);

                let pruned = previous
                    .clone()
                    .filter(|old| old != steam_id)
                    .and_then(|old| self.prune_if_orphaned(old));

                IndexChange { previous, pruned }
            }
            Mutation::Reject { member_id } => {
                self.rejected.insert(member_id.clone());
                self.whitelisted.remove(member_id);

                let previous = self.users.remove(member_id);
                let pruned = previous
                    .clone()
                    .and_then(|old| self.prune_if_orphaned(old));

                IndexChange { previous, pruned }
            }
        };

        debug_assert!(self.is_consistent(), "index drifted from mapping");
        change
    }

    fn prune_if_orphaned(&mut self, steam_id: SteamId) -> Option<SteamId> {
        if self.users.values().any(|owned| *owned == steam_id) {
            return None;
        }
        self.steam_ids.remove(&steam_id).then_some(steam_id)
    }

    /// True when every invariant listed in the module docs holds.
    pub fn is_consistent(&self) -> bool {
        let disjoint = self.whitelisted.is_disjoint(&self.rejected);
        let owned: BTreeSet<&SteamId> = self.users.values().collect();
        let indexed: BTreeSet<&SteamId> = self.steam_ids.iter().collect();
        disjoint && owned == indexed
    }

    pub fn steam_id_of(&self, member_id: &MemberId) -> Option<&SteamId> {
        self.users.get(member_id)
    }

    pub fn is_whitelisted(&self, member_id: &MemberId) -> bool {
        self.whitelisted.contains(member_id)
    }

    pub fn is_rejected(&self, member_id: &MemberId) -> bool {
        self.rejected.contains(member_id)
    }

    pub fn is_steam_id_indexed(&self, steam_id: &SteamId) -> bool {
        self.steam_ids.contains(steam_id)
    }

    /// Members mapped to `steam_id`, in ascending id order.
    pub fn owners_of(&self, steam_id: &SteamId) -> Vec<MemberId> {
        self.users
            .iter()
            .filter(|(_, owned)| *owned == steam_id)
            .map(|(member_id, _)| member_id.clone())
            .collect()
    }

    pub fn users(&self) -> &BTreeMap<MemberId, SteamId> {
        &self.users
    }

    pub fn steam_ids(&self) -> &BTreeSet<SteamId> {
        &self.steam_ids
    }

    pub fn whitelisted(&self) -> &BTreeSet<MemberId> {
        &self.whitelisted
    }

    pub fn rejected(&self) -> &BTreeSet<MemberId> {
        &self.rejected
    }

    /// Build state from a snapshot, dropping invalid entries and rebuilding
    /// the derived views so the invariants hold from the first operation.
    pub fn from_snapshot(snapshot: Snapshot) -> (Self, Repairs) {
        let mut repairs = Repairs::default();
        let mut state = Self::new();

        for (raw_member, raw_steam) in snapshot.users {
            match (MemberId::parse(&raw_member), SteamId::parse(&raw_steam)) {
                (Some(member_id), Ok(steam_id)) => {
                    state.users.insert(member_id, steam_id);
                }
                _ => {
                    warn!(member_id = %raw_member, steam_id = %raw_steam, "Dropping invalid mapping");
                    repairs.invalid_entries += 1;
                }
            }
        }

        state.steam_ids = state.users.values().cloned().collect();
        for raw in &snapshot.steamids {
            match SteamId::parse(raw) {
                Ok(steam_id) if !state.steam_ids.contains(&steam_id) => {
                    repairs.orphaned_steam_ids += 1;
                }
                Ok(_) => {}
                Err(_) => repairs.invalid_entries += 1,
            }
        }
        let listed: BTreeSet<&str> = snapshot.steamids.iter().map(|s| s.trim()).collect();
        repairs.unindexed_steam_ids = state
            .steam_ids
            .iter()
            .filter(|s| !listed.contains(s.as_str()))
            .count();

        let parse_set = |raw: BTreeSet<String>, repairs: &mut Repairs| -> BTreeSet<MemberId> {
            raw.iter()
                .filter_map(|id| {
                    let parsed = MemberId::parse(id);
                    if parsed.is_none() {
                        repairs.invalid_entries += 1;
                    }
                    parsed
                })
                .collect()
        };
        state.whitelisted = parse_set(snapshot.whitelisted_users, &mut repairs);
        state.rejected = parse_set(snapshot.rejected_users, &mut repairs);

        // A member listed in both sets keeps approval only if they still have
        // a mapping; rejection always deletes the mapping.
        let conflicting: Vec<MemberId> = state
            .whitelisted
            .intersection(&state.rejected)
            .cloned()
            .collect();
        for member_id in conflicting {
            repairs.conflicting_statuses += 1;
            if state.users.contains_key(&member_id) {
                state.rejected.remove(&member_id);
            } else {
                state.whitelisted.remove(&member_id);
            }
        }

        (state, repairs)
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            steamids: self.steam_ids.iter().map(|s| s.to_string()).collect(),
            users: self
                .users
                .iter()
                .map(|(member, steam)| (member.to_string(), steam.to_string()))
                .collect(),
            whitelisted_users: self.whitelisted.iter().map(|m| m.to_string()).collect(),
            rejected_users: self.rejected.iter().map(|m| m.to_string()).collect(),
        }
    }
}
