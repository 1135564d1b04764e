//! Invoice upload: decode, store, extract, record, schedule.

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use finvo_core::{compute_reminder, AppError, InvoiceRecord, ReminderRecord, UploadResponse};
use finvo_records::CreateOutcome;
use finvo_storage::keys;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::models::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

const DEFAULT_EXTENSION: &str = "jpg";

#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadImageRequest {
    /// Base64-encoded document bytes.
    pub image: Option<String>,
    /// File extension; defaults to `jpg`.
    pub extension: Option<String>,
}

#[utoipa::path(
    post,
    path = "/upload-image",
    tag = "invoices",
    security(("bearer_auth" = [])),
    request_body = UploadImageRequest,
    responses(
        (status = 200, description = "Invoice stored, analyzed, and scheduled", body = UploadResponse),
        (status = 400, description = "Missing or invalid image data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 502, description = "Extraction service unavailable", body = ErrorResponse)
    )
)]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<UploadImageRequest>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let encoded = request
        .image
        .filter(|i| !i.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing image data".to_string()))?;

    let extension = request
        .extension
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    if !state
        .config
        .allowed_extensions()
        .contains(&extension)
    {
        return Err(AppError::InvalidInput(format!(
            "Invalid extension '{}', allowed: {:?}",
            extension,
            state.config.allowed_extensions()
        ))
        .into());
    }

    let bytes = BASE64
        .decode(encoded.as_bytes())
        .map_err(|e| AppError::BadRequest(format!("Invalid base64 image data: {}", e)))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Image data is empty".to_string()).into());
    }
    if bytes.len() > state.config.max_upload_size_bytes() {
        return Err(AppError::InvalidInput(format!(
            "Upload of {} bytes exceeds the {} byte limit",
            bytes.len(),
            state.config.max_upload_size_bytes()
        ))
        .into());
    }

    let file_name = keys::new_upload_key(&user.user_id, &extension);
    let content_type = format!("image/{}", extension);
    state.store.put(&file_name, bytes, &content_type).await?;

    // Extraction runs against the stored object, not the request body.
    let extracted = state.analyzer.analyze(&file_name).await?;

    let now = Utc::now();
    let record = InvoiceRecord::new(file_name.clone(), extracted.clone(), now);
    state.invoices.append(&user.user_id, record).await?;

    let schedule = compute_reminder(now, &extracted);
    let reminder = ReminderRecord::from_schedule(file_name.clone(), now, schedule);
    let reminder = match state
        .reminders
        .create_if_absent(&user.user_id, reminder)
        .await?
    {
        CreateOutcome::Created(r) | CreateOutcome::AlreadyExists(r) => r,
    };

    tracing::info!(file_name = %file_name, "Invoice uploaded and scheduled");
    Ok(Json(UploadResponse {
        message: "Invoice uploaded and processed successfully".to_string(),
        s3_key: file_name.clone(),
        file_name,
        extracted,
        reminder: Some(reminder),
    }))
}
