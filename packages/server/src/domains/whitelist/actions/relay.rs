use tracing::{info, warn};

use crate::common::SteamId;
use crate::kernel::BaseCommandRelay;

/// Game server console command that whitelists `steam_id`.
pub fn whitelist_command(steam_id: &SteamId) -> String {
    format!("!com wl.add {}", steam_id)
}

/// Relay the whitelist command; returns how many channels accepted it.
pub async fn relay_whitelist(steam_id: &SteamId, relay: &dyn BaseCommandRelay) -> usize {
    match relay.broadcast(&whitelist_command(steam_id)).await {
        Ok(delivered) => {
            info!(steam_id = %steam_id, delivered, "Relayed whitelist command");
            delivered
        }
        Err(e) => {
            warn!(steam_id = %steam_id, error = %e, "Failed to relay whitelist command");
            0
        }
    }
}
