// Common types and utilities shared across the application

pub mod id;

pub use id::{MemberId, SteamId, SteamIdError, STEAM_ID_LENGTH};
