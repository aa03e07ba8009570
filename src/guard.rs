use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    context::SessionContext,
    models::{Role, Session},
};

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/login";
/// Where signed-in visitors lacking the required role are sent.
pub const HOME_PATH: &str = "/";

/// GuardDecision
///
/// Outcome of evaluating the route guard for one navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectTo(&'static str),
}

/// Denial
///
/// Why a navigation was refused. Only used for logging: visitors see the same
/// silent redirect shape for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    UnauthorizedRole,
}

impl Denial {
    pub fn redirect_target(self) -> &'static str {
        match self {
            Denial::Unauthenticated => LOGIN_PATH,
            Denial::UnauthorizedRole => HOME_PATH,
        }
    }
}

/// check
///
/// The guard rule. The session check comes first: without a session the role set
/// is never consulted. An empty role set admits any session.
pub fn check(session: Option<&Session>, required: &[Role]) -> Result<(), Denial> {
    let session = session.ok_or(Denial::Unauthenticated)?;
    if !required.is_empty() && !required.contains(&session.role) {
        return Err(Denial::UnauthorizedRole);
    }
    Ok(())
}

/// guard
///
/// Maps `check` onto a navigation decision.
pub fn guard(session: Option<&Session>, required: &[Role]) -> GuardDecision {
    match check(session, required) {
        Ok(()) => GuardDecision::Allow,
        Err(denial) => GuardDecision::RedirectTo(denial.redirect_target()),
    }
}

/// RouteGuard
///
/// Per-router guard configuration: the roles admitted (empty means any signed-in
/// session). Mounted with `middleware::from_fn_with_state(guard, route_guard)` as a
/// `route_layer`, inside the session provider.
#[derive(Clone, Debug)]
pub struct RouteGuard {
    roles: Arc<[Role]>,
}

impl RouteGuard {
    /// Admits any signed-in session.
    pub fn any_session() -> Self {
        Self { roles: Arc::new([]) }
    }

    /// Admits signed-in sessions whose role is one of `roles`.
    pub fn roles(roles: &[Role]) -> Self {
        Self {
            roles: roles.into(),
        }
    }

    pub fn evaluate(&self, session: Option<&Session>) -> GuardDecision {
        guard(session, &self.roles)
    }
}

/// route_guard
///
/// Re-evaluates the guard against the live session on every request; decisions are
/// never cached, so a login or logout takes effect on the very next navigation.
pub async fn route_guard(
    State(guard): State<RouteGuard>,
    sessions: SessionContext,
    request: Request,
    next: Next,
) -> Response {
    let session = sessions.current();
    match check(session.as_ref(), &guard.roles) {
        Ok(()) => next.run(request).await,
        Err(denial) => {
            tracing::debug!(
                ?denial,
                path = %request.uri().path(),
                required = ?guard.roles,
                "navigation refused"
            );
            Redirect::to(denial.redirect_target()).into_response()
        }
    }
}
