use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::slot::SlotError;

/// AppError
///
/// Failures the session core and handlers can surface. Guard denials are not errors:
/// they are answered with redirects by the route guard and never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The durable slot holds something that is not a session record.
    /// Recovered at startup by treating the session as absent.
    #[error("malformed session data in durable slot: {0}")]
    MalformedSessionData(#[from] serde_json::Error),

    /// A session could not be encoded for the durable slot. Nothing was persisted.
    #[error("could not encode session for the durable slot: {0}")]
    SessionEncoding(#[source] serde_json::Error),

    /// The durable slot could not be read or written.
    #[error(transparent)]
    Slot(#[from] SlotError),

    /// Session operations were requested on a router that the session provider
    /// does not wrap. This is a wiring bug, not a user condition.
    #[error("session context accessed outside of the session provider")]
    ContextMisuse,

    #[error("unknown blood group: {0}")]
    UnknownBloodGroup(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::UnknownBloodGroup(_) => StatusCode::BAD_REQUEST,
            AppError::ContextMisuse => {
                tracing::error!(error = %self, "wrap the router with the session provider layer");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::MalformedSessionData(_)
            | AppError::SessionEncoding(_)
            | AppError::Slot(_) => {
                tracing::error!(error = %self, "session persistence failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<u8>("x").unwrap_err()
    }

    #[test]
    fn encoding_failure_is_not_reported_as_malformed_slot_data() {
        let err = AppError::SessionEncoding(json_error());
        let message = err.to_string();
        assert!(message.starts_with("could not encode session"));
        assert!(!message.contains("malformed"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unknown_blood_group_is_a_bad_request() {
        let err = AppError::UnknownBloodGroup("Z".to_string());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
