//! Member-facing application flow over HTTP.

mod common;

use crate::common::{member, steam, TestHarness, COMMAND_CHANNELS};
use axum::http::StatusCode;
use serde_json::json;
use test_context::test_context;
use whitelist_core::domains::whitelist::{RoleFlag, RoleFlags, Snapshot};
use whitelist_core::kernel::test_dependencies::RoleCall;

const S1: &str = "76561198000000001";
const S2: &str = "76561198000000002";

#[test_context(TestHarness)]
#[tokio::test]
async fn new_member_applies_and_is_whitelisted(ctx: &TestHarness) {
    let a = ctx.join_guild("100", RoleFlags::NONE);

    let (status, body) = ctx.api().post("/apply", json!({ "member_id": "100" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "needs_steam_id");

    let (status, body) = ctx
        .api()
        .post("/apply/steam-id", json!({ "member_id": "100", "steam_id": S1 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "submitted");
    assert_eq!(body["steam_id"], S1);
    assert_eq!(body["flags"], "applied");
    assert_eq!(body["relayed_to"], COMMAND_CHANNELS);

    assert_eq!(ctx.roles.flags_of(&a), Some(RoleFlags::only(RoleFlag::Whitelisted)));
    assert_eq!(ctx.relay.commands(), vec![format!("!com wl.add {}", S1)]);

    // The flushed snapshot carries the new member.
    let snapshot = Snapshot::from_slice(&ctx.sink.contents().unwrap()).unwrap();
    assert_eq!(snapshot.users.get("100").map(String::as_str), Some(S1));
    assert!(snapshot.whitelisted_users.contains("100"));
    assert!(snapshot.steamids.contains(S1));

    let (_, body) = ctx.api().post("/apply", json!({ "member_id": "100" })).await;
    assert_eq!(body["outcome"], "already_whitelisted");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn malformed_steam_id_is_a_bad_request(ctx: &TestHarness) {
    ctx.join_guild("100", RoleFlags::NONE);

    for bad in ["7656119800000000", "765611980000000012", "7656119800000000a"] {
        let (status, body) = ctx
            .api()
            .post("/apply/steam-id", json!({ "member_id": "100", "steam_id": bad }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{bad}");
        assert!(body["error"].as_str().unwrap().contains("Steam ID"));
    }

    assert_eq!(ctx.sink.write_count(), 0);
    assert!(ctx.relay.commands().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn blank_member_id_is_a_bad_request(ctx: &TestHarness) {
    let (status, _) = ctx.api().post("/apply", json!({ "member_id": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn rejected_member_cannot_resubmit(ctx: &TestHarness) {
    ctx.seed_rejected("200").await;
    ctx.join_guild("200", RoleFlags::NONE);

    let (_, body) = ctx
        .api()
        .post("/apply/steam-id", json!({ "member_id": "200", "steam_id": S1 }))
        .await;

    assert_eq!(body["outcome"], "rejected");
    assert!(ctx.relay.commands().is_empty());
    // Rejected flag was restored on the way.
    assert_eq!(ctx.roles.calls(), vec![RoleCall::Add(member("200"), RoleFlag::Rejected)]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn rejoining_member_gets_role_back_on_apply(ctx: &TestHarness) {
    ctx.seed_approved("300", S1).await;
    let m = ctx.join_guild("300", RoleFlags::NONE);

    let (_, body) = ctx.api().post("/apply", json!({ "member_id": "300" })).await;

    assert_eq!(body["outcome"], "already_whitelisted");
    assert_eq!(ctx.roles.calls(), vec![RoleCall::Add(m.clone(), RoleFlag::Whitelisted)]);
    assert_eq!(ctx.roles.flags_of(&m), Some(RoleFlags::only(RoleFlag::Whitelisted)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn steam_id_can_be_shared_between_members(ctx: &TestHarness) {
    ctx.seed_approved("a", S1).await;
    ctx.join_guild("b", RoleFlags::NONE);

    let (status, _) = ctx
        .api()
        .post("/apply/steam-id", json!({ "member_id": "b", "steam_id": S1 }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let owners = ctx.deps.store.read(|s| s.owners_of(&steam(S1))).await;
    assert_eq!(owners, vec![member("a"), member("b")]);
}

#[tokio::test]
async fn unique_policy_refuses_shared_steam_id() {
    use whitelist_core::domains::whitelist::SteamIdPolicy;

    let ctx = TestHarness::with_policy(SteamIdPolicy::Unique);
    ctx.seed_approved("a", S1).await;
    ctx.join_guild("b", RoleFlags::NONE);

    let (status, body) = ctx
        .api()
        .post("/apply/steam-id", json!({ "member_id": "b", "steam_id": S1 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains(S1));

    let (status, _) = ctx
        .api()
        .post("/apply/steam-id", json!({ "member_id": "b", "steam_id": S2 }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn member_outside_guild_is_still_recorded(ctx: &TestHarness) {
    let (status, body) = ctx
        .api()
        .post("/apply/steam-id", json!({ "member_id": "ghost", "steam_id": S1 }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["flags"], "not_in_guild");
    assert!(ctx.deps.store.read(|s| s.is_approved(&member("ghost"))).await);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn health_reports_store_counts(ctx: &TestHarness) {
    ctx.seed_approved("a", S1).await;
    ctx.seed_rejected("b").await;

    let (status, body) = ctx.api().get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"]["whitelisted_users"], 1);
    assert_eq!(body["store"]["rejected_users"], 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn contradicting_flag_answers_without_touching_roles(ctx: &TestHarness) {
    ctx.seed_rejected("300").await;
    let m = ctx.join_guild("300", RoleFlags::only(RoleFlag::Whitelisted));

    let (status, body) = ctx.api().post("/apply", json!({ "member_id": "300" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "already_whitelisted");
    assert!(ctx.roles.calls().is_empty());
    assert_eq!(ctx.roles.flags_of(&m), Some(RoleFlags::only(RoleFlag::Whitelisted)));
    assert!(ctx.deps.store.read(|s| s.is_rejected(&m)).await);
}
