use crate::api::HealthResponse;
use crate::error::{ApiError, with_deadline};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// GET /health
/// Reports 503 when the backend does not answer a ping.
pub async fn health_check(State(state): State<AppState>) -> Response {
    let ping = with_deadline(state.request_timeout, state.paste_service.store().ping()).await;

    match ping {
        Ok(()) => Json(HealthResponse {
            message: "OK".into(),
        })
        .into_response(),
        Err(ApiError::Service(e)) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    message: "backend unavailable".into(),
                }),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}
