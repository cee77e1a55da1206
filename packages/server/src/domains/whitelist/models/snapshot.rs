//! On-disk layout of the whitelist database.
//!
//! Kept as plain strings so an older or hand-edited file still parses; the
//! store validates entries when it builds its in-memory state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Full snapshot of the store as written to the byte sink.
///
/// Missing keys default to empty containers so snapshots written before the
/// status sets existed still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub steamids: BTreeSet<String>,
    #[serde(default)]
    pub users: BTreeMap<String, String>,
    #[serde(default)]
    pub whitelisted_users: BTreeSet<String>,
    #[serde(default)]
    pub rejected_users: BTreeSet<String>,
}

impl Snapshot {
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Pretty-printed with two-space indentation.
    pub fn to_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}
