use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Admin token middleware
///
/// Requires `Authorization: Bearer <token>` matching the configured admin
/// token. Anything else is answered with 401 before the handler runs.
pub async fn admin_auth_middleware(
    admin_token: Arc<String>,
    request: Request,
    next: Next,
) -> Response {
    if !is_authorized(request.headers(), &admin_token) {
        debug!(path = %request.uri().path(), "Rejected admin request without valid token");
        return unauthorized_response();
    }

    next.run(request).await
}

/// Check the bearer token in `headers` against `expected`.
fn is_authorized(headers: &HeaderMap, expected: &str) -> bool {
    let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    else {
        return false;
    };

    // Constant-time over the expected token.
    let token = token.trim().as_bytes();
    let expected = expected.as_bytes();
    let mut diff = token.len() ^ expected.len();
    for (i, byte) in expected.iter().enumerate() {
        diff |= usize::from(byte ^ token.get(i).copied().unwrap_or(0));
    }
    !expected.is_empty() && diff == 0
}

/// Error response for requests without the admin token
pub fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Unauthorized: admin token required" })),
    )
        .into_response()
}
