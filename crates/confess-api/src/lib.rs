pub mod admin;
pub mod auth;
pub mod confessions;
pub mod error;
pub mod middleware;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, patch, post},
};

use crate::auth::AppState;

/// Build the full API router. Public routes need no credentials; admin
/// routes sit behind the bearer-token gate.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/confessions", get(confessions::list_approved))
        .route("/api/confessions", post(confessions::submit))
        .route("/api/confessions/stats", get(confessions::stats))
        .route("/api/confessions/{id}/reactions", patch(confessions::react))
        .route("/api/admin/login", post(auth::login))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/api/admin/confessions", get(admin::list_pending))
        .route("/api/admin/confessions/{id}/approve", patch(admin::approve))
        .route("/api/admin/confessions/{id}", delete(admin::delete))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .route("/health", get(|| async { "ok" }))
}
