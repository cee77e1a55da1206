use crate::common::{MemberId, SteamId};
use crate::domains::whitelist::WhitelistError;

/// Parse optional search inputs. Blank values count as absent; a present
/// Steam ID must be valid.
pub fn parse_search(
    member_id: Option<&str>,
    steam_id: Option<&str>,
) -> Result<(Option<MemberId>, Option<SteamId>), WhitelistError> {
    let member_id = member_id.and_then(MemberId::parse);
    let steam_id = steam_id
        .filter(|raw| !raw.trim().is_empty())
        .map(SteamId::parse)
        .transpose()?;

    if member_id.is_none() && steam_id.is_none() {
        return Err(WhitelistError::MissingSearchParameters);
    }
    Ok((member_id, steam_id))
}

/// Parse a required member ID.
pub fn require_member(raw: &str) -> Result<MemberId, WhitelistError> {
    MemberId::parse(raw).ok_or(WhitelistError::InvalidMemberId)
}
