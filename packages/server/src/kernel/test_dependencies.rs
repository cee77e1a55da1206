// TestDependencies - mock implementations for testing
//
// Provides in-memory and spy versions of every kernel trait so the store,
// the actions, and the HTTP layer can be exercised without a disk or Discord.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{BaseByteSink, BaseCommandRelay, BaseRoleService};
use crate::common::MemberId;
use crate::domains::whitelist::{RoleFlag, RoleFlags};

// =============================================================================
// Byte sinks
// =============================================================================

/// Sink that keeps the snapshot in memory and counts writes.
#[derive(Default)]
pub struct MemorySink {
    contents: Mutex<Option<Vec<u8>>>,
    writes: Mutex<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(bytes: &[u8]) -> Self {
        Self {
            contents: Mutex::new(Some(bytes.to_vec())),
            writes: Mutex::new(0),
        }
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl BaseByteSink for MemorySink {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.contents())
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        *self.contents.lock().unwrap() = Some(bytes.to_vec());
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Sink whose reads and writes always fail.
pub struct FailingSink;

impl BaseByteSink for FailingSink {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        Err(anyhow!("disk unavailable"))
    }

    fn write(&self, _bytes: &[u8]) -> Result<()> {
        Err(anyhow!("disk unavailable"))
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

// =============================================================================
// Mock Role Service
// =============================================================================

/// A flag mutation recorded by [`MockRoleService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleCall {
    Add(MemberId, RoleFlag),
    Remove(MemberId, RoleFlag),
}

/// In-memory guild: members not registered with `with_member` are treated
/// as not in the guild.
#[derive(Clone, Default)]
pub struct MockRoleService {
    members: Arc<Mutex<HashMap<MemberId, RoleFlags>>>,
    calls: Arc<Mutex<Vec<RoleCall>>>,
    lookups: Arc<Mutex<usize>>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MockRoleService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(self, member_id: &MemberId, flags: RoleFlags) -> Self {
        self.set_flags(member_id, flags);
        self
    }

    /// Make every `flags` call fail.
    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Make every add/remove call fail (calls are still recorded).
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Add a member after construction (e.g. simulating a rejoin).
    pub fn join(&self, member_id: &MemberId) {
        self.set_flags(member_id, RoleFlags::NONE);
    }

    /// Seat a member with `flags` without recording a call.
    pub fn set_flags(&self, member_id: &MemberId, flags: RoleFlags) {
        self.members
            .lock()
            .unwrap()
            .insert(member_id.clone(), flags);
    }

    /// Simulate the member leaving the guild.
    pub fn leave(&self, member_id: &MemberId) {
        self.members.lock().unwrap().remove(member_id);
    }

    pub fn calls(&self) -> Vec<RoleCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }

    pub fn flags_of(&self, member_id: &MemberId) -> Option<RoleFlags> {
        self.members.lock().unwrap().get(member_id).copied()
    }

    fn mutate(&self, call: RoleCall) -> Result<()> {
        self.calls.lock().unwrap().push(call.clone());
        if self.fail_writes {
            return Err(anyhow!("role service unavailable"));
        }

        let (member_id, flag, on) = match call {
            RoleCall::Add(member_id, flag) => (member_id, flag, true),
            RoleCall::Remove(member_id, flag) => (member_id, flag, false),
        };
        let mut members = self.members.lock().unwrap();
        let flags = members
            .get_mut(&member_id)
            .ok_or_else(|| anyhow!("unknown member {}", member_id))?;
        flags.set(flag, on);
        Ok(())
    }
}

#[async_trait]
impl BaseRoleService for MockRoleService {
    async fn flags(&self, member_id: &MemberId) -> Result<Option<RoleFlags>> {
        *self.lookups.lock().unwrap() += 1;
        if self.fail_reads {
            return Err(anyhow!("role service unavailable"));
        }
        Ok(self.flags_of(member_id))
    }

    async fn add_flag(&self, member_id: &MemberId, flag: RoleFlag) -> Result<()> {
        self.mutate(RoleCall::Add(member_id.clone(), flag))
    }

    async fn remove_flag(&self, member_id: &MemberId, flag: RoleFlag) -> Result<()> {
        self.mutate(RoleCall::Remove(member_id.clone(), flag))
    }
}

// =============================================================================
// Spy Command Relay
// =============================================================================

/// Records every broadcast command.
#[derive(Clone, Default)]
pub struct SpyCommandRelay {
    commands: Arc<Mutex<Vec<String>>>,
    channels: usize,
}

impl SpyCommandRelay {
    pub fn new(channels: usize) -> Self {
        Self {
            commands: Arc::new(Mutex::new(Vec::new())),
            channels,
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseCommandRelay for SpyCommandRelay {
    async fn broadcast(&self, command: &str) -> Result<usize> {
        self.commands.lock().unwrap().push(command.to_string());
        Ok(self.channels)
    }
}
