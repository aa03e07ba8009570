use std::ops::Deref;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    error::AppError,
    guard::LOGIN_PATH,
    models::Session,
    session::{SessionState, SessionStore},
};

/// provide_session
///
/// The session provider. Applied once around the whole router, it hands the
/// application's single `SessionStore` to every request so handlers can reach it
/// through `SessionContext` without threading it through their signatures.
pub async fn provide_session(
    State(sessions): State<SessionState>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(sessions);
    next.run(request).await
}

/// SessionContext
///
/// Extractor giving a handler the session store (login, logout, current).
///
/// Rejection: `AppError::ContextMisuse` (500) when the handler is mounted on a router
/// that `provide_session` does not wrap. There is no fallback store.
#[derive(Clone)]
pub struct SessionContext(SessionState);

impl SessionContext {
    pub fn from_parts(parts: &Parts) -> Result<Self, AppError> {
        parts
            .extensions
            .get::<SessionState>()
            .cloned()
            .map(SessionContext)
            .ok_or(AppError::ContextMisuse)
    }
}

impl Deref for SessionContext {
    type Target = SessionStore;

    fn deref(&self) -> &SessionStore {
        &self.0
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts)
    }
}

/// CurrentSession
///
/// Extractor resolving the signed-in session for handlers behind the route guard.
/// If the session disappeared between the guard and the handler, the request is sent
/// to the login page like any other unauthenticated access.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = SessionContext::from_parts(parts).map_err(IntoResponse::into_response)?;
        context
            .current()
            .map(CurrentSession)
            .ok_or_else(|| Redirect::to(LOGIN_PATH).into_response())
    }
}
