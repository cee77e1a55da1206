//! Mapping from domain errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domains::whitelist::WhitelistError;

/// Error returned by route handlers; rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    owners: Option<Vec<String>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<WhitelistError> for ApiError {
    fn from(err: WhitelistError) -> Self {
        let status = match &err {
            WhitelistError::InvalidSteamId(_)
            | WhitelistError::InvalidMemberId
            | WhitelistError::MissingSearchParameters => StatusCode::BAD_REQUEST,
            WhitelistError::NotFound => StatusCode::NOT_FOUND,
            WhitelistError::AmbiguousSteamId { .. }
            | WhitelistError::AlreadyRejected
            | WhitelistError::DuplicateSteamId(_) => StatusCode::CONFLICT,
        };
        let owners = match &err {
            WhitelistError::AmbiguousSteamId { owners, .. } => {
                Some(owners.iter().map(|o| o.to_string()).collect())
            }
            _ => None,
        };
        Self {
            status,
            message: err.to_string(),
            owners,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.owners {
            Some(owners) => json!({ "error": self.message, "owners": owners }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}
