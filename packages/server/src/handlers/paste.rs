use axum::{
    Json,
    extract::{DefaultBodyLimit, Path, State},
};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{BearerToken, MaybeBearerToken};
use crate::extractors::json::AppJson;
use crate::models::paste::{
    PasteResponse, SavePasteRequest, SavePasteResponse, validate_save_request,
};
use crate::state::AppState;

/// Save a new paste.
#[utoipa::path(
    post,
    path = "/save",
    tag = "Pastes",
    operation_id = "savePaste",
    summary = "Save a paste",
    description = "Stores a new paste and returns its identifier. A valid bearer token makes the caller the owner; without one (or with an invalid one) the paste is anonymous and can never be deleted.",
    request_body = SavePasteRequest,
    responses(
        (status = 200, description = "Paste saved", body = SavePasteResponse),
        (status = 400, description = "Invalid body or save failure (VALIDATION_ERROR, STORAGE_FAILURE)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, token, payload), fields(size = payload.content.len()))]
pub async fn save_paste(
    State(state): State<AppState>,
    MaybeBearerToken(token): MaybeBearerToken,
    AppJson(payload): AppJson<SavePasteRequest>,
) -> Result<Json<SavePasteResponse>, AppError> {
    validate_save_request(&payload, state.config.storage.max_blob_size)?;

    let id = state.pastes.save(token.as_deref(), payload.into()).await?;

    Ok(Json(SavePasteResponse {
        hash: id.into_inner(),
    }))
}

/// Fetch a paste by its identifier.
#[utoipa::path(
    get,
    path = "/get/{hash}",
    tag = "Pastes",
    operation_id = "getPaste",
    summary = "Get a paste",
    description = "Returns the title, language and content of a paste. Repeated reads are served from the cache.",
    params(("hash" = String, Path, description = "Paste identifier")),
    responses(
        (status = 200, description = "Paste found", body = PasteResponse),
        (status = 400, description = "Content could not be fetched (STORAGE_FAILURE)", body = ErrorBody),
        (status = 404, description = "Paste not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Metadata lookup failed (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(hash = %hash))]
pub async fn get_paste(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<PasteResponse>, AppError> {
    let view = state.pastes.fetch(&hash).await?;
    Ok(Json(view.into()))
}

/// Delete a paste owned by the caller.
#[utoipa::path(
    delete,
    path = "/delete/{hash}",
    tag = "Pastes",
    operation_id = "deletePaste",
    summary = "Delete a paste",
    description = "Removes a paste. Only the paste's owner may delete it; anonymous pastes cannot be deleted.",
    params(("hash" = String, Path, description = "Paste identifier")),
    responses(
        (status = 200, description = "Paste deleted"),
        (status = 400, description = "Delete failed (STORAGE_FAILURE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Caller does not own the paste (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Paste not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Metadata lookup failed (INTERNAL_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, token), fields(hash = %hash))]
pub async fn delete_paste(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(hash): Path<String>,
) -> Result<(), AppError> {
    state.pastes.delete(&token, &hash).await?;
    Ok(())
}

/// Body limit layer for the save route: the largest paste plus room for JSON
/// escaping and the other fields.
pub fn save_body_limit(max_blob_size: u64) -> DefaultBodyLimit {
    let limit = usize::try_from(max_blob_size.saturating_mul(2)).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(limit.saturating_add(64 * 1024))
}
