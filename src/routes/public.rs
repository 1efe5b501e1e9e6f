use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Unauthenticated, read-only endpoints. The announcement listing only ever returns
/// announcements inside their visibility window.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers and container orchestration.
        .route("/health", get(|| async { "ok" }))
        // GET /announcements
        // Active announcements, newest first. Served with and without the trailing slash.
        .route("/announcements", get(handlers::get_active_announcements))
        .route("/announcements/", get(handlers::get_active_announcements))
}
