//! On-demand re-extraction of a stored document. Never persists results;
//! the upload-time record stays authoritative.

use axum::{
    extract::{Path, State},
    Json,
};
use finvo_core::{AppError, ExtractionResponse};
use finvo_storage::keys;
use std::sync::Arc;

use crate::auth::models::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

async fn analyze_owned_file(
    state: &AppState,
    user: &AuthUser,
    file_name: String,
) -> Result<ExtractionResponse, AppError> {
    if !keys::user_owns_key(&user.user_id, &file_name) {
        return Err(AppError::Forbidden(
            "You do not have access to this file".to_string(),
        ));
    }
    if !state.store.exists(&file_name).await.map_err(AppError::from)? {
        return Err(AppError::NotFound(file_name));
    }

    let extracted = state.analyzer.analyze(&file_name).await?;
    Ok(ExtractionResponse {
        file_name,
        extracted,
    })
}

#[utoipa::path(
    get,
    path = "/extract-invoice/{file_name}",
    tag = "invoices",
    security(("bearer_auth" = [])),
    params(
        ("file_name" = String, Path, description = "Full storage key, e.g. uploads/{user_id}/{uuid}.jpg")
    ),
    responses(
        (status = 200, description = "Extraction output", body = ExtractionResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "File belongs to another user", body = ErrorResponse),
        (status = 404, description = "File does not exist", body = ErrorResponse),
        (status = 502, description = "Extraction service unavailable", body = ErrorResponse)
    )
)]
pub async fn extract_invoice(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(file_name): Path<String>,
) -> Result<Json<ExtractionResponse>, HttpAppError> {
    let response = analyze_owned_file(&state, &user, file_name).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/reanalyze/{file_name}",
    tag = "invoices",
    security(("bearer_auth" = [])),
    params(
        ("file_name" = String, Path, description = "Full storage key, e.g. uploads/{user_id}/{uuid}.jpg")
    ),
    responses(
        (status = 200, description = "Fresh extraction output; stored records are unchanged", body = ExtractionResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "File belongs to another user", body = ErrorResponse),
        (status = 404, description = "File does not exist", body = ErrorResponse),
        (status = 502, description = "Extraction service unavailable", body = ErrorResponse)
    )
)]
pub async fn reanalyze(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(file_name): Path<String>,
) -> Result<Json<ExtractionResponse>, HttpAppError> {
    let response = analyze_owned_file(&state, &user, file_name).await?;
    Ok(Json(response))
}
