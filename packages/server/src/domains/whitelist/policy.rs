use serde::{Deserialize, Serialize};

use super::models::WhitelistStore;
use super::WhitelistError;
use crate::common::{MemberId, SteamId};

/// Whether one Steam ID may be owned by several members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SteamIdPolicy {
    #[default]
    Shared,
    Unique,
}

impl SteamIdPolicy {
    /// Refuse an approval that would give `member_id` a Steam ID another
    /// member already owns, when ownership must be unique.
    pub fn check(
        self,
        store: &WhitelistStore,
        member_id: &MemberId,
        steam_id: &SteamId,
    ) -> Result<(), WhitelistError> {
        if self == Self::Shared {
            return Ok(());
        }
        let taken = store
            .owners_of(steam_id)
            .iter()
            .any(|owner| owner != member_id);
        if taken {
            Err(WhitelistError::DuplicateSteamId(steam_id.clone()))
        } else {
            Ok(())
        }
    }
}
