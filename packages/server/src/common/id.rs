//! Typed identity wrappers for compile-time type safety.
//!
//! Both identities are strings on the wire, so without wrappers it is easy to
//! pass a Steam ID where a member ID was expected. `MemberId` is the
//! platform-assigned account id; `SteamId` is the 17-digit Steam ID 64 a
//! member submits when applying.
//!
//! # Example
//!
//! ```rust
//! use whitelist_core::common::{MemberId, SteamId};
//!
//! let member = MemberId::parse("123456789012345678").unwrap();
//! let steam_id = SteamId::parse(" 76561198000000000 ").unwrap();
//! assert_eq!(steam_id.as_str(), "76561198000000000");
//!
//! assert!(SteamId::parse("7656119800000000x").is_err());
//! # let _ = member;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;
use thiserror::Error;

/// Number of digits in a Steam ID 64.
pub const STEAM_ID_LENGTH: usize = 17;

/// Why a raw Steam ID was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SteamIdError {
    #[error("Invalid Steam ID format. Must be 17 digits (got {0} characters).")]
    WrongLength(usize),

    #[error("Invalid Steam ID format. Must contain only digits.")]
    NonDigit,
}

/// Platform-assigned account identifier of a member.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Trims the input; `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated Steam ID 64: exactly 17 ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SteamId(String);

impl SteamId {
    /// Validate a raw Steam ID. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, SteamIdError> {
        let trimmed = raw.trim();
        if trimmed.len() != STEAM_ID_LENGTH {
            return Err(SteamIdError::WrongLength(trimmed.chars().count()));
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SteamIdError::NonDigit);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SteamId {
    type Err = SteamIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for SteamId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
