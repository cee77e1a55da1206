use thiserror::Error;

use crate::common::{MemberId, SteamId, SteamIdError};

/// Request-level failures of whitelist operations.
///
/// None of these mutate the store. Conflicts that need confirmation are not
/// errors; see `ApprovalOutcome::NeedsConfirmation` and `FindResult::Mismatch`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WhitelistError {
    #[error(transparent)]
    InvalidSteamId(#[from] SteamIdError),

    #[error("Member ID must not be empty")]
    InvalidMemberId,

    #[error("You must provide either a member ID or a Steam ID (or both)")]
    MissingSearchParameters,

    #[error("No user found with that Steam ID")]
    NotFound,

    #[error("Multiple users found with Steam ID {steam_id}; specify the member ID")]
    AmbiguousSteamId {
        steam_id: SteamId,
        owners: Vec<MemberId>,
    },

    #[error("User is already rejected")]
    AlreadyRejected,

    #[error("Steam ID {0} is already used by another member")]
    DuplicateSteamId(SteamId),
}
