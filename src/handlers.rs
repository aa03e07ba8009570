use crate::{
    AppState,
    context::{CurrentSession, SessionContext},
    error::AppError,
    guard::HOME_PATH,
    models::{
        self, AdminDashboard, AdminDashboardStats, AvailabilityUpdate, BloodBank, BloodBankDashboard,
        BloodGroup, DashboardContent, DashboardPage, DonorDashboard, Feature, HomePage,
        InventoryAdjustment, InventoryView, LoginForm, LoginRequest, Role,
        RoleOption, SeekerDashboard, Session,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;

/// Address used when the login form is submitted without an email.
pub const DEMO_EMAIL: &str = "demo@rapidblood.com";

// --- Filter Structs ---

/// BloodBankFilter
///
/// Query parameters for the blood-bank directory (GET /blood-banks). Empty values mean
/// "any", which is what the directory's select boxes send for "All Locations"/"Any Group".
#[derive(Deserialize, utoipa::IntoParams)]
pub struct BloodBankFilter {
    /// Exact location name, e.g. `Guntur`.
    pub location: Option<String>,
    /// Blood group that must be in stock, e.g. `O-`. Send `+` as `%2B`; an unencoded `+`
    /// decodes to a trailing space, which is also read as `+`.
    pub group: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// --- Public Handlers ---

/// home
///
/// [Public Route] The landing page data, including whoever is signed in.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Home page", body = HomePage))
)]
pub async fn home(sessions: SessionContext) -> Json<HomePage> {
    let feature = |title: &str, description: &str| Feature {
        title: title.to_string(),
        description: description.to_string(),
    };

    Json(HomePage {
        name: "RapidBlood".to_string(),
        tagline: "RapidBlood connects life-seekers with blood banks and voluntary donors in real-time."
            .to_string(),
        features: vec![
            feature(
                "Live Inventory",
                "Real-time tracking of blood units across verified network banks.",
            ),
            feature(
                "Donor Network",
                "Reach available voluntary donors near the patient.",
            ),
            feature(
                "Emergency Alerts",
                "Critical shortages are broadcast to the region immediately.",
            ),
        ],
        session: sessions.current(),
    })
}

/// get_blood_banks
///
/// [Public Route] Lists blood banks, optionally narrowed to one location and/or to banks
/// holding at least one unit of a blood group.
#[utoipa::path(
    get,
    path = "/blood-banks",
    params(BloodBankFilter),
    responses(
        (status = 200, description = "Filtered blood banks", body = [BloodBank]),
        (status = 400, description = "Unknown blood group")
    )
)]
pub async fn get_blood_banks(
    State(state): State<AppState>,
    Query(filter): Query<BloodBankFilter>,
) -> Result<Json<Vec<models::BloodBank>>, AppError> {
    let group = non_empty(filter.group)
        .map(|raw| raw.parse::<BloodGroup>())
        .transpose()?;
    let banks = state
        .repo
        .list_blood_banks(non_empty(filter.location), group)
        .await;
    Ok(Json(banks))
}

/// login_form
///
/// [Public Route] The roles offered on the sign-in form. Guest is valid at login but
/// not offered.
#[utoipa::path(
    get,
    path = "/login",
    responses((status = 200, description = "Login form", body = LoginForm))
)]
pub async fn login_form() -> Json<LoginForm> {
    let roles = [
        ("Seeker", Role::Seeker),
        ("Donor", Role::Donor),
        ("Blood Bank", Role::BloodBank),
        ("Admin", Role::Admin),
    ]
    .into_iter()
    .map(|(label, value)| RoleOption {
        label: label.to_string(),
        value,
    })
    .collect();

    Json(LoginForm {
        roles,
        default_role: Role::Seeker,
    })
}

/// login
///
/// [Public Route] Signs in as `role` with no credential check, replacing any current
/// session. The client navigates to /dashboard afterwards.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = Session),
        (status = 500, description = "Session could not be persisted")
    )
)]
pub async fn login(
    sessions: SessionContext,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    let email = match payload.email.trim() {
        "" => DEMO_EMAIL,
        email => email,
    };
    Ok(Json(sessions.login(email, payload.role)?))
}

/// logout
///
/// [Public Route] Signs out and returns to the home page. Harmless when signed out.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 303, description = "Signed out, redirect to /"))
)]
pub async fn logout(sessions: SessionContext) -> Result<Redirect, AppError> {
    sessions.logout()?;
    Ok(Redirect::to(HOME_PATH))
}

/// get_session
///
/// [Public Route] The current session, or `null`.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Current session", body = Option<Session>))
)]
pub async fn get_session(sessions: SessionContext) -> Json<Option<Session>> {
    Json(sessions.current())
}

// --- Authenticated Handlers ---

/// get_dashboard
///
/// [Authenticated Route] Builds the dashboard for the signed-in role.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = DashboardPage),
        (status = 303, description = "Not signed in, redirect to /login")
    )
)]
pub async fn get_dashboard(
    CurrentSession(session): CurrentSession,
    State(state): State<AppState>,
) -> Json<DashboardPage> {
    let repo = &state.repo;

    let content = match session.role {
        Role::Admin => Some(DashboardContent::Admin(AdminDashboard {
            stats: repo.get_stats().await,
            alerts: repo.alerts().await,
        })),
        Role::BloodBank => {
            let mut nearby_donors = repo.list_donors().await;
            nearby_donors.truncate(4);
            let mut pending_requests = repo.list_requests().await;
            pending_requests.truncate(3);
            Some(DashboardContent::BloodBank(BloodBankDashboard {
                inventory: repo.inventory().await,
                nearby_donors,
                pending_requests,
            }))
        }
        Role::Seeker => {
            let mut active_requests = repo.list_requests().await;
            active_requests.truncate(2);
            let mut nearby_banks = repo.list_blood_banks(None, None).await;
            nearby_banks.truncate(3);
            Some(DashboardContent::Seeker(SeekerDashboard {
                active_requests,
                nearby_banks,
            }))
        }
        Role::Donor => {
            let history = repo.donation_history(&session.email).await;
            Some(DashboardContent::Donor(DonorDashboard {
                blood_group: session.blood_group,
                total_donations: 12,
                available: repo.donor_availability(&session.id).await,
                history,
            }))
        }
        Role::Guest => None,
    };

    Json(DashboardPage { session, content })
}

// --- Role-Restricted Handlers ---

/// get_inventory
///
/// [Blood Bank Route] The managed inventory.
#[utoipa::path(
    get,
    path = "/dashboard/inventory",
    responses((status = 200, description = "Inventory", body = InventoryView))
)]
pub async fn get_inventory(State(state): State<AppState>) -> Json<InventoryView> {
    Json(InventoryView {
        inventory: state.repo.inventory().await,
    })
}

/// adjust_inventory
///
/// [Blood Bank Route] Adds `delta` units (negative to remove) to one group. Stock is
/// clamped at zero rather than rejected.
#[utoipa::path(
    patch,
    path = "/dashboard/inventory/{group}",
    params(("group" = String, Path, description = "Blood group, e.g. O-")),
    request_body = InventoryAdjustment,
    responses(
        (status = 200, description = "Updated inventory", body = InventoryView),
        (status = 400, description = "Unknown blood group")
    )
)]
pub async fn adjust_inventory(
    State(state): State<AppState>,
    Path(group): Path<String>,
    Json(payload): Json<InventoryAdjustment>,
) -> Result<Json<InventoryView>, AppError> {
    let group = group.parse::<BloodGroup>()?;
    let inventory = state.repo.adjust_inventory(group, payload.delta).await;
    Ok(Json(InventoryView { inventory }))
}

/// set_availability
///
/// [Donor Route] Marks the signed-in donor as available or not.
#[utoipa::path(
    put,
    path = "/dashboard/availability",
    request_body = AvailabilityUpdate,
    responses((status = 200, description = "Availability", body = AvailabilityUpdate))
)]
pub async fn set_availability(
    CurrentSession(session): CurrentSession,
    State(state): State<AppState>,
    Json(payload): Json<AvailabilityUpdate>,
) -> Json<AvailabilityUpdate> {
    let available = state
        .repo
        .set_donor_availability(&session.id, payload.available)
        .await;
    tracing::info!(session_id = %session.id, available, "donor availability changed");
    Json(AvailabilityUpdate { available })
}

/// get_admin_stats
///
/// [Admin Route] Catalog counters.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses((status = 200, description = "Stats", body = AdminDashboardStats))
)]
pub async fn get_admin_stats(State(state): State<AppState>) -> Json<AdminDashboardStats> {
    Json(state.repo.get_stats().await)
}
