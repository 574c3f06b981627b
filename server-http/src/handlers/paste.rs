use crate::api::{CreatePasteRequest, PasteResponse};
use crate::error::{ApiError, with_deadline};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::info;

/// POST /api/paste
pub async fn create_paste(
    State(state): State<AppState>,
    body: Result<Json<CreatePasteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PasteResponse>), ApiError> {
    let Json(req) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let lifetime = req.lifetime_seconds.unwrap_or(state.default_lifetime_secs);
    info!("CREATE: {} bytes, lifetime={}s", req.content.len(), lifetime);

    let paste = with_deadline(
        state.request_timeout,
        state.paste_service.create_paste(req.content, lifetime),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(paste.into())))
}

/// GET /api/paste/{id}
pub async fn get_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PasteResponse>, ApiError> {
    info!("GET: id={}", id);

    match with_deadline(state.request_timeout, state.paste_service.get_paste(&id)).await? {
        Some(paste) => Ok(Json(paste.into())),
        None => Err(shared::Error::NotFound.into()),
    }
}

/// DELETE /api/paste/{id}
pub async fn delete_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    info!("DELETE: id={}", id);

    let result = with_deadline(state.request_timeout, state.paste_service.delete_paste(&id)).await?;
    if result.deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(shared::Error::NotFound.into())
    }
}
