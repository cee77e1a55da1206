use axum::{extract::Extension, Json};
use serde::Deserialize;

use crate::domains::whitelist::actions::{self, ApplyOutcome};
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub member_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitSteamIdRequest {
    pub member_id: String,
    pub steam_id: String,
}

/// Member pressed "apply".
pub async fn apply_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<ApplyRequest>,
) -> Result<Json<ApplyOutcome>, ApiError> {
    let member_id = actions::require_member(&body.member_id)?;
    Ok(Json(actions::apply(&member_id, &state.deps).await))
}

/// Member submitted the Steam ID form.
pub async fn submit_steam_id_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<SubmitSteamIdRequest>,
) -> Result<Json<ApplyOutcome>, ApiError> {
    let outcome = actions::submit_steam_id(&body.member_id, &body.steam_id, &state.deps).await?;
    Ok(Json(outcome))
}
