use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch},
};

/// Blood Bank Router Module
///
/// Inventory management. Signed-in users with another role are redirected to /.
pub fn blood_bank_routes() -> Router<AppState> {
    Router::new()
        // GET /dashboard/inventory
        .route("/dashboard/inventory", get(handlers::get_inventory))
        // PATCH /dashboard/inventory/{group}
        // The +/- controls: body `{ "delta": 1 }` or `{ "delta": -1 }`. Never below zero.
        .route(
            "/dashboard/inventory/{group}",
            patch(handlers::adjust_inventory),
        )
}
