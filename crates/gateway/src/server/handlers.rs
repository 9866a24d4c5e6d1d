//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{ChannelError, ErrorResponse, HealthResponse, MethodCall, MethodResult};
use tracing::{debug, warn};

use super::state::AppState;

/// `POST /invoke` — run one method call on the channel.
///
/// The call is dispatched as its own task; the handler only awaits the
/// delivered result. The response body is the [`MethodResult`] and the
/// status follows its error code. A body that is not a valid [`MethodCall`]
/// (missing `method`, `arguments` that is not an object) is answered with an
/// `INVALID_ARGUMENTS` result.
pub async fn invoke(
    State(state): State<AppState>,
    call: Result<Json<MethodCall>, JsonRejection>,
) -> Response {
    let call = match call {
        Ok(Json(call)) => call,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "rejected malformed method call");
            let result = MethodResult::from(ChannelError::invalid_arguments(
                rejection.body_text(),
            ));
            return result_response(result);
        }
    };

    match state.channel.dispatch(call).await {
        Ok(result) => result_response(result),
        Err(_) => {
            warn!("method call task ended without delivering a result");
            let body = ErrorResponse::new(
                ErrorResponse::INTERNAL_ERROR,
                "method call did not complete",
            );
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

fn result_response(result: MethodResult) -> Response {
    let status =
        StatusCode::from_u16(result.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(result)).into_response()
}

/// `GET /health` — readiness check.
///
/// Reports whether a stored configuration is held: `200 OK` when one is,
/// `503 Service Unavailable` otherwise. Calls that carry inline credentials
/// work either way, so deployments that rely only on inline credentials
/// should probe liveness at the TCP level instead.
pub async fn health(State(state): State<AppState>) -> Response {
    let configured = state.channel.gateway().is_configured();

    let (status_code, status_str) = if configured {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unconfigured")
    };

    let body = HealthResponse {
        status: status_str.into(),
        configured,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let body = ErrorResponse::new(
        ErrorResponse::NOT_FOUND,
        "the requested resource does not exist",
    );
    (StatusCode::NOT_FOUND, Json(body))
}
