use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::domains::whitelist::actions::{self, ApprovalOutcome, FindResponse, RejectOutcome};
use crate::domains::whitelist::{FindResult, StoreStats};
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct WhitelistRequest {
    pub member_id: String,
    pub steam_id: String,
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct MemberOrSteamId {
    pub member_id: Option<String>,
    pub steam_id: Option<String>,
}

/// Approve a member. 409 when an existing Steam ID would be replaced without `overwrite`.
pub async fn admin_whitelist_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<WhitelistRequest>,
) -> Result<(StatusCode, Json<ApprovalOutcome>), ApiError> {
    let outcome =
        actions::admin_whitelist(&body.member_id, &body.steam_id, body.overwrite, &state.deps)
            .await?;
    let status = match outcome {
        ApprovalOutcome::Approved { .. } => StatusCode::OK,
        ApprovalOutcome::NeedsConfirmation { .. } => StatusCode::CONFLICT,
    };
    Ok((status, Json(outcome)))
}

pub async fn admin_reject_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<MemberOrSteamId>,
) -> Result<Json<RejectOutcome>, ApiError> {
    let outcome = actions::admin_reject(
        body.member_id.as_deref(),
        body.steam_id.as_deref(),
        &state.deps,
    )
    .await?;
    Ok(Json(outcome))
}

/// Look up by member ID, Steam ID, or both.
pub async fn admin_find_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<MemberOrSteamId>,
) -> Result<(StatusCode, Json<FindResponse>), ApiError> {
    let response = actions::find_member(
        query.member_id.as_deref(),
        query.steam_id.as_deref(),
        &state.deps,
    )
    .await?;
    let status = match response.result {
        FindResult::NotFound => StatusCode::NOT_FOUND,
        FindResult::Mismatch { .. } => StatusCode::CONFLICT,
        _ => StatusCode::OK,
    };
    Ok((status, Json(response)))
}

pub async fn admin_stats_handler(Extension(state): Extension<AppState>) -> Json<StoreStats> {
    Json(actions::stats(&state.deps).await)
}
