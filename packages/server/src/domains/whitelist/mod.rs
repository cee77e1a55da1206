//! Whitelist domain - membership records and role reconciliation
//!
//! Architecture:
//!   HTTP route / CLI → actions → SharedStore (mutation + snapshot flush)
//!                              → BaseRoleService / BaseCommandRelay (best-effort)

pub mod actions;
pub mod errors;
pub mod models;
pub mod policy;
pub mod reconcile;

// Re-export commonly used types
pub use errors::WhitelistError;
pub use models::{
    FindResult, IndexChange, MemberStatus, MemberView, MutationReport, RoleFlag, RoleFlags,
    SharedStore, Snapshot, StoreState, StoreStats, WhitelistStore,
};
pub use policy::SteamIdPolicy;
pub use reconcile::{ReconcileReport, Reconciliation};
