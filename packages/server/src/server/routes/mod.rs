// HTTP routes
pub mod admin;
pub mod apply;
pub mod events;
pub mod health;

pub use admin::*;
pub use apply::*;
pub use events::*;
pub use health::*;
