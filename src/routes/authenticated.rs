use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes for any signed-in role. Visitors without a session are redirected to /login
/// by the guard layered on this router.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // GET /dashboard
        // Role-specific dashboard. Any role is admitted; a guest gets an empty one.
        .route("/dashboard", get(handlers::get_dashboard))
}
