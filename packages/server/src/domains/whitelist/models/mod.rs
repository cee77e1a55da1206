pub mod index;
pub mod lookup;
pub mod shared;
pub mod snapshot;
pub mod status;
pub mod store;

pub use index::{IndexChange, Repairs, StoreState};
pub use lookup::{FindResult, MemberView};
pub use shared::SharedStore;
pub use snapshot::Snapshot;
pub use status::{MemberStatus, RoleFlag, RoleFlags};
pub use store::{MutationReport, StoreStats, WhitelistStore};
