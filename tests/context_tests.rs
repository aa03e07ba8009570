use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    routing::get,
};
use rapidblood::handlers;
use tower::util::ServiceExt;

// A router that mounts session handlers but forgets the session provider.
fn unwired_router() -> Router {
    Router::new()
        .route("/session", get(handlers::get_session))
        .route("/", get(handlers::home))
}

#[tokio::test]
async fn test_session_context_outside_provider_fails_loudly() {
    for uri in ["/session", "/"] {
        let response = unwired_router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .contains("outside of the session provider")
        );
    }
}
