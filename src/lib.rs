use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
    response::Redirect,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Session core: durable slot, store, provider, guard.
pub mod context;
pub mod guard;
pub mod session;
pub mod slot;

// Catalog, wire types and HTTP surface.
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Routers grouped by who may reach them.
pub mod routes;
use routes::{admin, authenticated, blood_bank, donor, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use context::{CurrentSession, SessionContext};
pub use error::AppError;
pub use guard::{GuardDecision, RouteGuard, guard};
pub use repository::{InMemoryRepository, RepositoryState};
pub use session::{SessionState, SessionStore};
pub use slot::{FileSlot, MemorySlot, SlotState};

use guard::{HOME_PATH, route_guard};
use models::Role;

/// ApiDoc
///
/// OpenAPI document for every navigable path, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::home, handlers::get_blood_banks, handlers::login_form, handlers::login,
        handlers::logout, handlers::get_session, handlers::get_dashboard,
        handlers::get_inventory, handlers::adjust_inventory, handlers::set_availability,
        handlers::get_admin_stats
    ),
    components(
        schemas(
            models::Session, models::Role, models::BloodGroup, models::BloodBank, models::Donor,
            models::BloodRequest, models::Alert, models::DonationRecord, models::LoginRequest,
            models::InventoryAdjustment, models::InventoryView, models::AvailabilityUpdate,
            models::HomePage, models::LoginForm, models::AdminDashboardStats,
            models::DashboardContent, models::DashboardPage,
        )
    ),
    tags(
        (name = "rapidblood", description = "RapidBlood blood-donation coordination API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything the handlers share: the catalog, the one session store, and the config.
/// Built once at the application root.
#[derive(Clone)]
pub struct AppState {
    /// Catalog and dashboard state.
    pub repo: RepositoryState,
    /// The process-wide session store. Handlers reach it through `SessionContext`.
    pub sessions: SessionState,
    pub config: AppConfig,
}

impl AppState {
    /// Assembles the state, restoring the persisted session. This is the only place the
    /// session store is initialized.
    pub fn new(config: AppConfig, repo: RepositoryState, slot: SlotState) -> Self {
        let sessions = SessionStore::initialize(slot, config.session_key.clone());
        Self {
            repo,
            sessions: std::sync::Arc::new(sessions),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// guarded
///
/// Puts `router` behind `guard`. `route_layer` keeps the guard off unmatched paths, so
/// those still reach the fallback redirect.
fn guarded(router: Router<AppState>, guard: RouteGuard) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(guard, route_guard))
}

/// create_router
///
/// Assembles the routing structure, applies the session provider and the route guards,
/// and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(guarded(
            authenticated::authenticated_routes(),
            RouteGuard::any_session(),
        ))
        .merge(guarded(
            blood_bank::blood_bank_routes(),
            RouteGuard::roles(&[Role::BloodBank]),
        ))
        .merge(guarded(donor::donor_routes(), RouteGuard::roles(&[Role::Donor])))
        .nest(
            "/admin",
            guarded(admin::admin_routes(), RouteGuard::roles(&[Role::Admin])),
        )
        // Catch-all: unknown paths go home.
        .fallback(|| async { Redirect::to(HOME_PATH) })
        // Session provider: outermost application layer, so every guard and handler
        // above runs inside it.
        .layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            context::provide_session,
        ))
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one request, correlated by the `x-request-id` header.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
