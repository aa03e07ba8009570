use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Oversight endpoints, nested under `/admin` and restricted to the admin role.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        // Bank, verified-bank, active-donor and pending-request counts.
        .route("/stats", get(handlers::get_admin_stats))
}
