//! Membership queries by member ID, by Steam ID, or both.

use serde::Serialize;

use super::index::StoreState;
use super::status::MemberStatus;
use super::store::WhitelistStore;
use crate::common::{MemberId, SteamId};
use crate::domains::whitelist::WhitelistError;

/// One member as reported by a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberView {
    pub member_id: MemberId,
    pub steam_id: Option<SteamId>,
    pub status: MemberStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum FindResult {
    /// Lookup by member ID (alone or confirmed by a matching Steam ID).
    Member {
        user: MemberView,
        /// Other members mapped to the same Steam ID.
        shared_with: Vec<MemberId>,
    },
    /// Lookup by Steam ID alone.
    SteamOwners {
        steam_id: SteamId,
        users: Vec<MemberView>,
        multiple: bool,
    },
    /// Both IDs were given but the store maps the member elsewhere (or nowhere).
    Mismatch {
        member_id: MemberId,
        steam_id: SteamId,
        stored: Option<SteamId>,
    },
    NotFound,
}

impl FindResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Member { .. } | Self::SteamOwners { .. })
    }
}

impl StoreState {
    fn status_of(&self, member_id: &MemberId) -> MemberStatus {
        if self.is_whitelisted(member_id) {
            MemberStatus::Whitelisted
        } else if self.is_rejected(member_id) {
            MemberStatus::Rejected
        } else {
            MemberStatus::Unknown
        }
    }

    pub fn find(
        &self,
        member_id: Option<&MemberId>,
        steam_id: Option<&SteamId>,
    ) -> Result<FindResult, WhitelistError> {
        match (member_id, steam_id) {
            (Some(member_id), Some(steam_id)) => {
                let stored = self.steam_id_of(member_id);
                if stored == Some(steam_id) {
                    Ok(self.find_by_member(member_id))
                } else {
                    Ok(FindResult::Mismatch {
                        member_id: member_id.clone(),
                        steam_id: steam_id.clone(),
                        stored: stored.cloned(),
                    })
                }
            }
            (Some(member_id), None) => Ok(self.find_by_member(member_id)),
            (None, Some(steam_id)) => Ok(self.find_by_steam_id(steam_id)),
            (None, None) => Err(WhitelistError::MissingSearchParameters),
        }
    }

    pub fn find_by_member(&self, member_id: &MemberId) -> FindResult {
        let Some(steam_id) = self.steam_id_of(member_id) else {
            // Rejection deletes the mapping, so a rejected member has no Steam ID on file.
            // Older files can also list a whitelisted member without one.
            let status = self.status_of(member_id);
            if status == MemberStatus::Unknown {
                return FindResult::NotFound;
            }
            return FindResult::Member {
                user: MemberView {
                    member_id: member_id.clone(),
                    steam_id: None,
                    status,
                },
                shared_with: Vec::new(),
            };
        };

        let shared_with = self
            .owners_of(steam_id)
            .into_iter()
            .filter(|owner| owner != member_id)
            .collect();

        FindResult::Member {
            user: MemberView {
                member_id: member_id.clone(),
                steam_id: Some(steam_id.clone()),
                status: self.status_of(member_id),
            },
            shared_with,
        }
    }

    pub fn find_by_steam_id(&self, steam_id: &SteamId) -> FindResult {
        let users: Vec<MemberView> = self
            .owners_of(steam_id)
            .into_iter()
            .map(|member_id| MemberView {
                status: self.status_of(&member_id),
                steam_id: Some(steam_id.clone()),
                member_id,
            })
            .collect();

        if users.is_empty() {
            return FindResult::NotFound;
        }

        FindResult::SteamOwners {
            steam_id: steam_id.clone(),
            multiple: users.len() > 1,
            users,
        }
    }
}

impl WhitelistStore {
    pub fn find(
        &self,
        member_id: Option<&MemberId>,
        steam_id: Option<&SteamId>,
    ) -> Result<FindResult, WhitelistError> {
        self.state().find(member_id, steam_id)
    }
}
