//! Invoice listing and latest-upload lookup.

use axum::{extract::State, Json};
use finvo_core::{AppError, InvoiceListResponse, LatestInvoiceResponse};
use finvo_storage::keys;
use std::sync::Arc;

use crate::auth::models::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/my-invoices",
    tag = "invoices",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's invoice records, empty when none", body = InvoiceListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn my_invoices(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<InvoiceListResponse>, HttpAppError> {
    let invoices = state.invoices.list(&user.user_id).await?;
    Ok(Json(InvoiceListResponse { invoices }))
}

#[utoipa::path(
    get,
    path = "/latest-invoice",
    tag = "invoices",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Most recently modified uploaded file", body = LatestInvoiceResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "No uploads found", body = ErrorResponse)
    )
)]
pub async fn latest_invoice(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<LatestInvoiceResponse>, HttpAppError> {
    let prefix = keys::user_prefix(&user.user_id);
    let objects = state.store.list(&prefix).await.map_err(AppError::from)?;

    // The metadata documents under the prefix are bookkeeping, not uploads.
    let latest = objects
        .into_iter()
        .filter(|o| !keys::is_metadata_key(&o.key))
        .max_by_key(|o| o.last_modified)
        .ok_or_else(|| AppError::NotFound("No invoices found".to_string()))?;

    Ok(Json(LatestInvoiceResponse {
        file_name: latest.key,
        last_modified: latest.last_modified,
    }))
}
