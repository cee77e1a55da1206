//! Test harness wiring the real router to in-memory dependencies.
//!
//! Each test gets a fresh store, mock guild, and spy relay. Nothing touches
//! the disk or the chat platform.

use std::sync::Arc;

use axum::Router;
use test_context::AsyncTestContext;
use whitelist_core::common::{MemberId, SteamId};
use whitelist_core::domains::whitelist::{
    RoleFlags, SharedStore, SteamIdPolicy, WhitelistStore,
};
use whitelist_core::kernel::test_dependencies::{MemorySink, MockRoleService, SpyCommandRelay};
use whitelist_core::kernel::ServerDeps;
use whitelist_core::server::build_app;

use super::ApiClient;

pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const COMMAND_CHANNELS: usize = 2;

/// Test harness that manages test infrastructure.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let (status, body) = ctx.api().get("/health").await;
/// }
/// ```
pub struct TestHarness {
    pub deps: ServerDeps,
    /// Snapshot bytes as last flushed by the store.
    pub sink: Arc<MemorySink>,
    pub roles: MockRoleService,
    pub relay: SpyCommandRelay,
    router: Router,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::with_policy(SteamIdPolicy::Shared)
    }

    async fn teardown(self) {
        // Everything is in memory and dropped with the harness
    }
}

impl TestHarness {
    pub fn with_policy(policy: SteamIdPolicy) -> Self {
        // Initialize tracing subscriber to respect RUST_LOG environment variable.
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let sink = Arc::new(MemorySink::new());
        let roles = MockRoleService::new();
        let relay = SpyCommandRelay::new(COMMAND_CHANNELS);

        let deps = ServerDeps::new(
            SharedStore::new(WhitelistStore::empty(sink.clone())),
            Arc::new(roles.clone()),
            Arc::new(relay.clone()),
            policy,
        );
        let router = build_app(deps.clone(), ADMIN_TOKEN.to_string());

        Self {
            deps,
            sink,
            roles,
            relay,
            router,
        }
    }

    /// Client for unauthenticated requests.
    pub fn api(&self) -> ApiClient {
        ApiClient::new(self.router.clone(), None)
    }

    /// Client that sends the admin bearer token.
    pub fn admin(&self) -> ApiClient {
        ApiClient::new(self.router.clone(), Some(ADMIN_TOKEN.to_string()))
    }

    /// Put `member_id` in the mock guild with the given flags.
    pub fn join_guild(&self, member_id: &str, flags: RoleFlags) -> MemberId {
        let member_id = member(member_id);
        self.roles.set_flags(&member_id, flags);
        member_id
    }

    /// Approve directly in the store, bypassing HTTP.
    pub async fn seed_approved(&self, member_id: &str, steam_id: &str) {
        let (member_id, steam_id) = (member(member_id), steam(steam_id));
        self.deps
            .store
            .write(|store| {
                store.approve(&member_id, &steam_id);
            })
            .await;
    }

    /// Reject directly in the store, bypassing HTTP.
    pub async fn seed_rejected(&self, member_id: &str) {
        let member_id = member(member_id);
        self.deps
            .store
            .write(|store| {
                store.reject(&member_id);
            })
            .await;
    }
}

pub fn member(id: &str) -> MemberId {
    MemberId::parse(id).expect("valid member id")
}

pub fn steam(raw: &str) -> SteamId {
    SteamId::parse(raw).expect("valid steam id")
}
