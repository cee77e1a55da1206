//! Application setup and router configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::admin_auth_middleware;
use crate::server::routes::{
    admin_find_handler, admin_reject_handler, admin_stats_handler, admin_whitelist_handler,
    apply_handler, health_handler, member_joined_handler, submit_steam_id_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// Build the Axum application router
///
/// Public routes serve the member-facing application flow. Admin routes and
/// the gateway event hook sit behind the bearer token.
pub fn build_app(deps: ServerDeps, admin_token: String) -> Router {
    let app_state = AppState {
        deps: Arc::new(deps),
    };
    let admin_token = Arc::new(admin_token);

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let protected = Router::new()
        .route("/admin/whitelist", post(admin_whitelist_handler))
        .route("/admin/reject", post(admin_reject_handler))
        .route("/admin/find", get(admin_find_handler))
        .route("/admin/stats", get(admin_stats_handler))
        .route("/events/member-joined", post(member_joined_handler))
        .route_layer(middleware::from_fn(move |req, next| {
            admin_auth_middleware(admin_token.clone(), req, next)
        }));

    Router::new()
        .route("/health", get(health_handler))
        .route("/apply", post(apply_handler))
        .route("/apply/steam-id", post(submit_steam_id_handler))
        .merge(protected)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
