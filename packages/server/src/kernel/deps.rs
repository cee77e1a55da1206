//! Server dependencies for whitelist actions (using traits for testability)
//!
//! This module provides the central dependency container used by the
//! actions and HTTP routes. All external services use trait abstractions to
//! enable testing.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use discord::DiscordService;
use std::sync::Arc;
use tracing::{info, warn};

use crate::common::MemberId;
use crate::domains::whitelist::{RoleFlag, RoleFlags, SharedStore, SteamIdPolicy};
use crate::kernel::{BaseCommandRelay, BaseRoleService};

// =============================================================================
// Discord Adapters (implement BaseRoleService / BaseCommandRelay)
// =============================================================================

/// Role ids backing the two external flags.
#[derive(Debug, Clone)]
pub struct RoleIds {
    pub whitelisted: String,
    pub rejected: String,
}

impl RoleIds {
    fn id_for(&self, flag: RoleFlag) -> &str {
        match flag {
            RoleFlag::Whitelisted => &self.whitelisted,
            RoleFlag::Rejected => &self.rejected,
        }
    }
}

/// Wrapper around DiscordService that implements BaseRoleService
pub struct DiscordRoleAdapter {
    service: Arc<DiscordService>,
    roles: RoleIds,
}

impl DiscordRoleAdapter {
    pub fn new(service: Arc<DiscordService>, roles: RoleIds) -> Self {
        Self { service, roles }
    }
}

#[async_trait]
impl BaseRoleService for DiscordRoleAdapter {
    async fn flags(&self, member_id: &MemberId) -> Result<Option<RoleFlags>> {
        let member = self
            .service
            .fetch_member(member_id.as_str())
            .await
            .map_err(|e| anyhow!("{}", e))?;

        Ok(member.map(|m| RoleFlags {
            whitelisted: m.has_role(&self.roles.whitelisted),
            rejected: m.has_role(&self.roles.rejected),
        }))
    }

    async fn add_flag(&self, member_id: &MemberId, flag: RoleFlag) -> Result<()> {
        self.service
            .add_member_role(member_id.as_str(), self.roles.id_for(flag))
            .await
            .map_err(|e| anyhow!("{}", e))
    }

    async fn remove_flag(&self, member_id: &MemberId, flag: RoleFlag) -> Result<()> {
        self.service
            .remove_member_role(member_id.as_str(), self.roles.id_for(flag))
            .await
            .map_err(|e| anyhow!("{}", e))
    }
}

/// Posts commands to the configured command channels.
pub struct DiscordCommandRelay {
    service: Arc<DiscordService>,
    channels: Vec<String>,
}

impl DiscordCommandRelay {
    pub fn new(service: Arc<DiscordService>, channels: Vec<String>) -> Self {
        Self { service, channels }
    }
}

#[async_trait]
impl BaseCommandRelay for DiscordCommandRelay {
    async fn broadcast(&self, command: &str) -> Result<usize> {
        let mut delivered = 0;
        for channel_id in &self.channels {
            match self.service.send_message(channel_id, command).await {
                Ok(_) => {
                    info!(channel_id = %channel_id, command, "Command sent");
                    delivered += 1;
                }
                Err(e) => warn!(channel_id = %channel_id, error = %e, "Failed to send command"),
            }
        }
        Ok(delivered)
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to actions (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub store: SharedStore,
    pub roles: Arc<dyn BaseRoleService>,
    pub relay: Arc<dyn BaseCommandRelay>,
    pub steam_id_policy: SteamIdPolicy,
}

impl ServerDeps {
    pub fn new(
        store: SharedStore,
        roles: Arc<dyn BaseRoleService>,
        relay: Arc<dyn BaseCommandRelay>,
        steam_id_policy: SteamIdPolicy,
    ) -> Self {
        Self {
            store,
            roles,
            relay,
            steam_id_policy,
        }
    }
}
