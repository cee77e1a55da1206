//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod file_sink;
pub mod test_dependencies;
pub mod traits;

pub use deps::{DiscordCommandRelay, DiscordRoleAdapter, RoleIds, ServerDeps};
pub use file_sink::FileSink;
pub use traits::*;
