use crate::{AppState, handlers};
use axum::{Router, routing::put};

/// Donor Router Module
pub fn donor_routes() -> Router<AppState> {
    Router::new()
        // PUT /dashboard/availability
        // The ACTIVE/INACTIVE toggle on the donor dashboard.
        .route("/dashboard/availability", put(handlers::set_availability))
}
