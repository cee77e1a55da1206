// Whitelist Keeper - API Core
//
// Keeps the guild's game-server whitelist: which members are approved, which
// Steam ID each one plays under, and who has been turned away. The store is a
// single JSON snapshot; role flags on the chat platform are reconciled from it.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
