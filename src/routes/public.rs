use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. Login and logout live here: they operate on
/// the session itself and must work from either state.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // Landing page data plus the current session, if any.
        .route("/", get(handlers::home))
        // GET /blood-banks?location=...&group=...
        // Directory of blood banks with optional location / in-stock group filters.
        .route("/blood-banks", get(handlers::get_blood_banks))
        // GET /login, POST /login
        // Role choices for the form; submitting replaces any current session.
        .route("/login", get(handlers::login_form).post(handlers::login))
        // POST /logout
        // Idempotent sign-out, then back to /.
        .route("/logout", post(handlers::logout))
        // GET /session
        // Who is signed in, or null.
        .route("/session", get(handlers::get_session))
}
