//! Axum router construction.

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, state::AppState};

/// Per-request timeout applied to all routes.
///
/// A timed-out `/invoke` request does not cancel its dispatched call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the application [`Router`] with all routes and middleware attached.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/invoke", post(handlers::invoke))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::gateway::CryptoGateway;
    use crate::kms::stub::{Behaviour, StubKms};
    use axum::{body::Body, http::Request};
    use axum_test::TestServer;
    use common::{ErrorCode, HealthResponse, MethodCall, MethodResult};
    use tower::ServiceExt;

    fn server_over(stub: &StubKms) -> TestServer {
        let state = AppState::new(CryptoGateway::new(Arc::new(stub.clone())));
        TestServer::new(build(state)).unwrap()
    }

    fn configure_call() -> MethodCall {
        MethodCall::new("configure")
            .arg("accessKeyId", "AKIA")
            .arg("secretAccessKey", "secret")
            .arg("region", "eu-west-1")
            .arg("keyId", "alias/app")
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let state = AppState::new(CryptoGateway::new(Arc::new(StubKms::faithful())));
        let app = build(state);
        let req = Request::builder()
            .uri("/unknown")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn configure_encrypt_decrypt_over_http() {
        let stub = StubKms::faithful();
        let server = server_over(&stub);

        let resp = server.get("/health").await;
        assert_eq!(resp.status_code(), 503);

        let resp = server.post("/invoke").json(&configure_call()).await;
        assert_eq!(resp.status_code(), 200);
        assert_eq!(resp.json::<MethodResult>(), MethodResult::success("configured"));

        let resp = server.get("/health").await;
        assert_eq!(resp.status_code(), 200);
        assert!(resp.json::<HealthResponse>().configured);

        let resp = server
            .post("/invoke")
            .json(&MethodCall::new("encrypt").arg("plaintext", "over the wire"))
            .await;
        assert_eq!(resp.status_code(), 200);
        let ciphertext = match resp.json::<MethodResult>() {
            MethodResult::Success { result } => result,
            other => panic!("expected success, got {other:?}"),
        };

        let resp = server
            .post("/invoke")
            .json(&MethodCall::new("decrypt").arg("encryptedText", ciphertext))
            .await;
        assert_eq!(
            resp.json::<MethodResult>(),
            MethodResult::success("over the wire")
        );
        assert_eq!(stub.live_clients(), 0);
    }

    #[tokio::test]
    async fn error_codes_map_to_http_status() {
        let stub = StubKms::new(Behaviour::Fail("ThrottlingException: Rate exceeded".into()));
        let server = server_over(&stub);

        let resp = server
            .post("/invoke")
            .json(&MethodCall::new("encrypt").arg("plaintext", "hi"))
            .await;
        assert_eq!(resp.status_code(), 400);

        server.post("/invoke").json(&configure_call()).await;

        let resp = server
            .post("/invoke")
            .json(&MethodCall::new("decrypt").arg("encryptedText", "not-valid-base64!"))
            .await;
        assert_eq!(resp.status_code(), 400);
        match resp.json::<MethodResult>() {
            MethodResult::Error(e) => assert_eq!(e.code, ErrorCode::InvalidBase64String),
            other => panic!("expected error, got {other:?}"),
        }

        let resp = server
            .post("/invoke")
            .json(&MethodCall::new("encrypt").arg("plaintext", "hi"))
            .await;
        assert_eq!(resp.status_code(), 502);
        match resp.json::<MethodResult>() {
            MethodResult::Error(e) => {
                assert_eq!(e.code, ErrorCode::EncryptionError);
                assert!(e.details.unwrap().contains("ThrottlingException"));
            }
            other => panic!("expected error, got {other:?}"),
        }
        assert_eq!(stub.live_clients(), 0);
    }

    #[tokio::test]
    async fn inline_credentials_serve_while_health_is_unconfigured() {
        let stub = StubKms::faithful();
        let server = server_over(&stub);

        let resp = server
            .post("/invoke")
            .json(
                &MethodCall::new("encrypt")
                    .arg("plaintext", "hi")
                    .arg("accessKeyId", "AKIA")
                    .arg("secretAccessKey", "secret")
                    .arg("region", "eu-west-1")
                    .arg("keyId", "alias/inline"),
            )
            .await;
        assert_eq!(resp.status_code(), 200);

        let resp = server.get("/health").await;
        assert_eq!(resp.status_code(), 503);
        assert!(!resp.json::<HealthResponse>().configured);
    }

    #[tokio::test]
    async fn null_arguments_return_error_triple() {
        let server = server_over(&StubKms::faithful());
        let resp = server
            .post("/invoke")
            .json(&serde_json::json!({"method": "encrypt", "arguments": null}))
            .await;
        assert_eq!(resp.status_code(), 400);
        match resp.json::<MethodResult>() {
            MethodResult::Error(e) => assert_eq!(e.code, ErrorCode::InvalidArguments),
            other => panic!("expected error, got {other:?}"),
        }
    }
}
