use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::index::{IndexChange, Mutation, StoreState};
use super::snapshot::Snapshot;
use super::status::RoleFlag;
use crate::common::{MemberId, SteamId};
use crate::kernel::BaseByteSink;

/// Counts of tracked identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total_steam_ids: usize,
    pub total_users: usize,
    pub whitelisted_users: usize,
    pub rejected_users: usize,
}

/// Outcome of an approve/reject call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReport {
    pub change: IndexChange,
    /// False when the snapshot could not be written; memory is still updated.
    pub persisted: bool,
}

/// Whitelist database: in-memory state plus the byte sink it is flushed to.
///
/// Every mutation updates memory and then overwrites the sink with a full
/// snapshot before returning. Storage failures never surface as errors from
/// `load` or the mutations; they are logged and memory stays authoritative.
pub struct WhitelistStore {
    state: StoreState,
    sink: Arc<dyn BaseByteSink>,
}

impl WhitelistStore {
    /// Empty store bound to `sink`. Nothing is written.
    pub fn empty(sink: Arc<dyn BaseByteSink>) -> Self {
        Self {
            state: StoreState::new(),
            sink,
        }
    }

    /// Load the store from `sink`.
    ///
    /// - absent: start empty and write the empty snapshot immediately;
    /// - unreadable or malformed: log, start empty, leave the sink untouched
    ///   until the next mutation overwrites it.
    pub fn load(sink: Arc<dyn BaseByteSink>) -> Self {
        let location = sink.describe();

        let bytes = match sink.read() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                info!(location = %location, "Whitelist database not found, starting with empty database");
                let store = Self::empty(sink);
                // A failed first write is already logged by persist.
                let _ = store.persist();
                return store;
            }
            Err(e) => {
                error!(location = %location, error = %e, "Failed to read whitelist database, starting empty");
                return Self::empty(sink);
            }
        };

        match Snapshot::from_slice(&bytes) {
            Ok(snapshot) => {
                let (state, repairs) = StoreState::from_snapshot(snapshot);
                if !repairs.is_empty() {
                    warn!(location = %location, ?repairs, "Repaired inconsistent whitelist database");
                }
                let store = Self { state, sink };
                let stats = store.stats();
                info!(
                    steam_ids = stats.total_steam_ids,
                    whitelisted = stats.whitelisted_users,
                    rejected = stats.rejected_users,
                    "Loaded whitelist database"
                );
                store
            }
            Err(e) => {
                error!(location = %location, error = %e, "Whitelist database is malformed, resetting to empty");
                Self::empty(sink)
            }
        }
    }

    /// Overwrite the sink with a full snapshot. Errors are logged here too.
    pub fn persist(&self) -> Result<()> {
        let result = self
            .state
            .to_snapshot()
            .to_vec()
            .context("Failed to serialize whitelist database")
            .and_then(|bytes| self.sink.write(&bytes));

        match &result {
            Ok(()) => debug!("Whitelist database saved"),
            Err(e) => error!(error = %e, location = %self.sink.describe(), "Failed to save whitelist database"),
        }
        result
    }

    /// Map `member_id` to `steam_id` and mark them whitelisted.
    pub fn approve(&mut self, member_id: &MemberId, steam_id: &SteamId) -> MutationReport {
        self.commit(Mutation::Approve {
            member_id,
            steam_id,
        })
    }

    /// Mark `member_id` rejected and drop their mapping.
    pub fn reject(&mut self, member_id: &MemberId) -> MutationReport {
        self.commit(Mutation::Reject { member_id })
    }

    fn commit(&mut self, mutation: Mutation<'_>) -> MutationReport {
        let change = self.state.apply(mutation);
        let persisted = self.persist().is_ok();
        MutationReport { change, persisted }
    }

    pub fn is_approved(&self, member_id: &MemberId) -> bool {
        self.state.is_whitelisted(member_id)
    }

    pub fn is_rejected(&self, member_id: &MemberId) -> bool {
        self.state.is_rejected(member_id)
    }

    pub fn steam_id_of(&self, member_id: &MemberId) -> Option<&SteamId> {
        self.state.steam_id_of(member_id)
    }

    pub fn is_steam_id_whitelisted(&self, steam_id: &SteamId) -> bool {
        self.state.is_steam_id_indexed(steam_id)
    }

    pub fn owners_of(&self, steam_id: &SteamId) -> Vec<MemberId> {
        self.state.owners_of(steam_id)
    }

    /// Status recorded in the store, independent of the mapping.
    pub fn stored_status(&self, member_id: &MemberId) -> Option<RoleFlag> {
        if self.state.is_whitelisted(member_id) {
            Some(RoleFlag::Whitelisted)
        } else if self.state.is_rejected(member_id) {
            Some(RoleFlag::Rejected)
        } else {
            None
        }
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            total_steam_ids: self.state.steam_ids().len(),
            total_users: self.state.users().len(),
            whitelisted_users: self.state.whitelisted().len(),
            rejected_users: self.state.rejected().len(),
        }
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }
}
