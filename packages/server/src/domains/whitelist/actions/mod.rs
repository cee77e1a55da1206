pub mod admin;
pub mod apply;
pub mod flags;
pub mod member_joined;
pub mod params;
pub mod relay;

pub use admin::{
    admin_reject, admin_whitelist, find_member, stats, ApprovalOutcome, FindResponse,
    RejectOutcome,
};
pub use apply::{apply, submit_steam_id, ApplyOutcome};
pub use flags::{set_standing, FlagSync};
pub use member_joined::member_joined;
pub use params::{parse_search, require_member};
pub use relay::{relay_whitelist, whitelist_command};
