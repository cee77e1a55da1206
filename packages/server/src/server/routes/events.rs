use axum::{extract::Extension, Json};
use serde::Deserialize;

use crate::domains::whitelist::actions;
use crate::domains::whitelist::ReconcileReport;
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct MemberJoinedEvent {
    pub member_id: String,
}

/// Gateway bridge reports a member (re)joining the guild.
pub async fn member_joined_handler(
    Extension(state): Extension<AppState>,
    Json(event): Json<MemberJoinedEvent>,
) -> Result<Json<ReconcileReport>, ApiError> {
    let member_id = actions::require_member(&event.member_id)?;
    Ok(Json(actions::member_joined(&member_id, &state.deps).await))
}
