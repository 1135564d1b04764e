//! Manual reminder management.

use axum::{extract::State, Json};
use chrono::Utc;
use finvo_core::policy::parse_utc_timestamp;
use finvo_core::{
    compute_explicit_reminder, AppError, CreateReminderResponse, DeleteReminderResponse,
    ReminderListResponse, ReminderRecord,
};
use finvo_records::{CreateOutcome, DeleteOutcome};
use finvo_storage::keys;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::models::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReminderRequest {
    /// Full storage key of the file the reminder is for.
    pub file_name: String,
    /// Optional deadline (ISO-8601, interpreted as UTC). Defaults to the
    /// computed reminder time.
    pub due_date: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteReminderRequest {
    pub file_name: String,
}

#[utoipa::path(
    post,
    path = "/create-reminder",
    tag = "reminders",
    security(("bearer_auth" = [])),
    request_body = CreateReminderRequest,
    responses(
        (status = 200, description = "Reminder created, or already existed (see flag)", body = CreateReminderResponse),
        (status = 400, description = "Unparseable due date", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "File belongs to another user", body = ErrorResponse)
    )
)]
pub async fn create_reminder(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateReminderRequest>,
) -> Result<Json<CreateReminderResponse>, HttpAppError> {
    if !keys::user_owns_key(&user.user_id, &request.file_name) {
        return Err(AppError::Forbidden(
            "You do not have access to this file".to_string(),
        )
        .into());
    }

    let now = Utc::now();
    let reminder_time = compute_explicit_reminder(now);
    let due_date = match request.due_date {
        Some(raw) => parse_utc_timestamp(&raw).ok_or_else(|| {
            AppError::InvalidInput(format!("Unparseable due date '{}'", raw))
        })?,
        None => reminder_time,
    };

    let record = ReminderRecord {
        file_name: request.file_name,
        created_at: now,
        due_date,
        reminder_time,
    };

    let response = match state.reminders.create_if_absent(&user.user_id, record).await? {
        CreateOutcome::Created(reminder) => CreateReminderResponse {
            message: "Reminder created".to_string(),
            reminder,
            already_existed: false,
        },
        CreateOutcome::AlreadyExists(reminder) => CreateReminderResponse {
            message: "Reminder already exists for this file".to_string(),
            reminder,
            already_existed: true,
        },
    };
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/get-reminders",
    tag = "reminders",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's pending reminders, empty when none", body = ReminderListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn get_reminders(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ReminderListResponse>, HttpAppError> {
    let reminders = state.reminders.list_for_user(&user.user_id).await?;
    Ok(Json(ReminderListResponse { reminders }))
}

#[utoipa::path(
    post,
    path = "/delete-reminder",
    tag = "reminders",
    security(("bearer_auth" = [])),
    request_body = DeleteReminderRequest,
    responses(
        (status = 200, description = "Reminder deleted, or no matching entry (see flag)", body = DeleteReminderResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "File belongs to another user", body = ErrorResponse),
        (status = 404, description = "Caller has no reminders document", body = ErrorResponse)
    )
)]
pub async fn delete_reminder(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<DeleteReminderRequest>,
) -> Result<Json<DeleteReminderResponse>, HttpAppError> {
    if !keys::user_owns_key(&user.user_id, &request.file_name) {
        return Err(AppError::Forbidden(
            "You do not have access to this file".to_string(),
        )
        .into());
    }

    let response = match state
        .reminders
        .delete_by_file_name(&user.user_id, &request.file_name)
        .await?
    {
        DeleteOutcome::Deleted => DeleteReminderResponse {
            message: "Reminder deleted".to_string(),
            deleted: true,
        },
        DeleteOutcome::NotFound => DeleteReminderResponse {
            message: "No reminder found for this file".to_string(),
            deleted: false,
        },
        DeleteOutcome::NoDocument => {
            return Err(AppError::NotFound("No reminders found".to_string()).into());
        }
    };
    Ok(Json(response))
}
