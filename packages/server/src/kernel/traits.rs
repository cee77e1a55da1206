// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Whitelist rules live in domains/whitelist and only talk to these seams.
//
// Naming convention: Base* for trait names (e.g., BaseRoleService)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::MemberId;
use crate::domains::whitelist::{RoleFlag, RoleFlags};

// =============================================================================
// Byte Sink Trait (Infrastructure - durable snapshot storage)
// =============================================================================

/// Durable location the whitelist snapshot is read from and overwritten.
pub trait BaseByteSink: Send + Sync {
    /// Current contents, or `None` if nothing has been written yet.
    fn read(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the contents entirely.
    fn write(&self, bytes: &[u8]) -> Result<()>;

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}

// =============================================================================
// Role Service Trait (Infrastructure - external role flags)
// =============================================================================

#[async_trait]
pub trait BaseRoleService: Send + Sync {
    /// Flags the member carries, or `None` if they are not in the guild.
    async fn flags(&self, member_id: &MemberId) -> Result<Option<RoleFlags>>;

    async fn add_flag(&self, member_id: &MemberId, flag: RoleFlag) -> Result<()>;

    async fn remove_flag(&self, member_id: &MemberId, flag: RoleFlag) -> Result<()>;
}

// =============================================================================
// Command Relay Trait (Infrastructure - game server command channels)
// =============================================================================

#[async_trait]
pub trait BaseCommandRelay: Send + Sync {
    /// Post `command` to every configured channel.
    ///
    /// Returns how many channels accepted it; per-channel failures are
    /// logged by the implementation and do not make the call fail.
    async fn broadcast(&self, command: &str) -> Result<usize>;
}
