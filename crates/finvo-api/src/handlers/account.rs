//! Signup and login, delegated to the identity provider.

use axum::{extract::State, Json};
use finvo_core::AppError;
use finvo_services::AuthTokens;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignupResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub tokens: AuthTokens,
}

/// Pull out email and password, rejecting requests missing either.
fn require_credentials(request: CredentialsRequest) -> Result<(String, String), AppError> {
    let email = request
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Email and password are required".to_string()))?;
    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("Email and password are required".to_string()))?;
    Ok((email, password))
}

#[utoipa::path(
    post,
    path = "/signup",
    tag = "account",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "User registered", body = SignupResponse),
        (status = 400, description = "Missing fields or user already exists", body = ErrorResponse),
        (status = 502, description = "Identity provider unavailable", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CredentialsRequest>,
) -> Result<Json<SignupResponse>, HttpAppError> {
    let (email, password) = require_credentials(request)?;

    state.identity.signup(&email, &password).await?;

    tracing::info!("User registered");
    Ok(Json(SignupResponse {
        message: "User registered successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "account",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Incorrect credentials", body = ErrorResponse),
        (status = 502, description = "Identity provider unavailable", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CredentialsRequest>,
) -> Result<Json<LoginResponse>, HttpAppError> {
    let (email, password) = require_credentials(request)?;

    let tokens = state.identity.login(&email, &password).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        tokens,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_credentials_rejects_missing_email() {
        let result = require_credentials(CredentialsRequest {
            email: None,
            password: Some("pw".to_string()),
        });
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_require_credentials_rejects_blank_email() {
        let result = require_credentials(CredentialsRequest {
            email: Some("   ".to_string()),
            password: Some("pw".to_string()),
        });
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_require_credentials_accepts_complete_pair() {
        let (email, password) = require_credentials(CredentialsRequest {
            email: Some("a@b.co".to_string()),
            password: Some("pw".to_string()),
        })
        .unwrap();
        assert_eq!(email, "a@b.co");
        assert_eq!(password, "pw");
    }
}
