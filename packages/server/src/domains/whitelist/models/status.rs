use serde::Serialize;
use std::fmt;

/// Membership status derived from the store for a single member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Whitelisted,
    Rejected,
    /// Mapped to a Steam ID but in neither status set (legacy snapshots).
    Unknown,
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Whitelisted => "whitelisted",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// One of the two external role flags mirrored from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleFlag {
    Whitelisted,
    Rejected,
}

impl RoleFlag {
    /// The flag that must not coexist with this one.
    pub fn opposite(self) -> Self {
        match self {
            Self::Whitelisted => Self::Rejected,
            Self::Rejected => Self::Whitelisted,
        }
    }
}

impl fmt::Display for RoleFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Whitelisted => f.write_str("whitelisted"),
            Self::Rejected => f.write_str("rejected"),
        }
    }
}

/// Role flags currently carried by a member in the guild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleFlags {
    pub whitelisted: bool,
    pub rejected: bool,
}

impl RoleFlags {
    pub const NONE: Self = Self {
        whitelisted: false,
        rejected: false,
    };

    pub fn only(flag: RoleFlag) -> Self {
        let mut flags = Self::NONE;
        flags.set(flag, true);
        flags
    }

    pub fn has(&self, flag: RoleFlag) -> bool {
        match flag {
            RoleFlag::Whitelisted => self.whitelisted,
            RoleFlag::Rejected => self.rejected,
        }
    }

    pub fn set(&mut self, flag: RoleFlag, on: bool) {
        match flag {
            RoleFlag::Whitelisted => self.whitelisted = on,
            RoleFlag::Rejected => self.rejected = on,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.whitelisted && !self.rejected
    }

    /// Single status as seen in-session; whitelisted takes precedence.
    pub fn status(&self) -> Option<RoleFlag> {
        if self.whitelisted {
            Some(RoleFlag::Whitelisted)
        } else if self.rejected {
            Some(RoleFlag::Rejected)
        } else {
            None
        }
    }
}
