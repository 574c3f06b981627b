use crate::api::ErrorResponse;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Everything a handler can fail with, mapped onto a status code and a JSON body
#[derive(Debug)]
pub enum ApiError {
    Service(shared::Error),
    BadRequest(String),
    Timeout,
}

impl From<shared::Error> for ApiError {
    fn from(err: shared::Error) -> Self {
        ApiError::Service(err)
    }
}

fn error_response(msg: &str, status: StatusCode) -> Response {
    (status, Json(ErrorResponse::new(msg))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => error_response(&msg, StatusCode::BAD_REQUEST),
            ApiError::Service(shared::Error::Validation(e)) => {
                error_response(&e.to_string(), StatusCode::BAD_REQUEST)
            }
            ApiError::Service(shared::Error::NotFound) => {
                error_response("paste not found", StatusCode::NOT_FOUND)
            }
            // Backend details stay in the log.
            ApiError::Service(e) => {
                error!("Request failed: {}", e);
                error_response("internal server error", StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Timeout => {
                warn!("Request exceeded its deadline");
                error_response("request timed out", StatusCode::SERVICE_UNAVAILABLE)
            }
        }
    }
}

/// Run a service call under the per-request deadline.
pub async fn with_deadline<T, F>(timeout: Duration, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = shared::Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(_) => Err(ApiError::Timeout),
    }
}
