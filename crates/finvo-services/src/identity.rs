//! Identity provider client.
//!
//! User records live entirely in the managed identity service; this system
//! never stores credentials or emails itself. Signup and login are plain
//! delegations, and the sweeper resolves a subject identifier to an email
//! address through the same service.

use async_trait::async_trait;
use finvo_core::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Token bundle returned by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Identity provider contract: signup, login, and email lookup.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a user. Duplicate registrations are a client error.
    async fn signup(&self, email: &str, password: &str) -> Result<(), AppError>;

    /// Authenticate and return the provider's token bundle.
    async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, AppError>;

    /// Resolve a subject identifier to an email address, if one is on file.
    async fn lookup_email(&self, user_id: &str) -> Result<Option<String>, AppError>;
}

#[derive(Serialize)]
struct CredentialsRequest<'a> {
    client_id: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    tokens: AuthTokens,
}

#[derive(Deserialize)]
struct EmailResponse {
    email: String,
}

#[derive(Deserialize)]
struct ProviderError {
    #[serde(default)]
    error: String,
}

/// HTTP implementation against the managed identity service.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: String, client_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
        }
    }

    async fn error_body(response: reqwest::Response) -> String {
        response
            .json::<ProviderError>()
            .await
            .map(|e| e.error)
            .unwrap_or_default()
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn signup(&self, email: &str, password: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(format!("{}/signup", self.base_url))
            .json(&CredentialsRequest {
                client_id: &self.client_id,
                email,
                password,
            })
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("Signup request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = Self::error_body(response).await;
        if status == reqwest::StatusCode::CONFLICT {
            return Err(AppError::BadRequest("User already exists".to_string()));
        }
        if status.is_client_error() {
            let message = if message.is_empty() {
                "Signup rejected".to_string()
            } else {
                message
            };
            return Err(AppError::BadRequest(message));
        }
        Err(AppError::Identity(format!(
            "Identity provider returned {} on signup: {}",
            status, message
        )))
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, AppError> {
        let response = self
            .client
            .post(format!("{}/login", self.base_url))
            .json(&CredentialsRequest {
                client_id: &self.client_id,
                email,
                password,
            })
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("Login request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppError::Unauthorized(
                "Incorrect username or password".to_string(),
            ));
        }
        if !status.is_success() {
            let message = Self::error_body(response).await;
            return Err(AppError::Identity(format!(
                "Identity provider returned {} on login: {}",
                status, message
            )));
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("Malformed login response: {}", e)))?;
        Ok(body.tokens)
    }

    async fn lookup_email(&self, user_id: &str) -> Result<Option<String>, AppError> {
        let response = self
            .client
            .get(format!("{}/users/{}/email", self.base_url, user_id))
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("Email lookup failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::Identity(format!(
                "Identity provider returned {} on email lookup",
                status
            )));
        }

        let body: EmailResponse = response
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("Malformed email lookup response: {}", e)))?;
        Ok(Some(body.email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let provider =
            HttpIdentityProvider::new("https://id.example.com/".to_string(), "c1".to_string());
        assert_eq!(provider.base_url, "https://id.example.com");
    }

    #[test]
    fn test_auth_tokens_skip_absent_fields() {
        let tokens = AuthTokens {
            access_token: "abc".to_string(),
            id_token: None,
            refresh_token: None,
            expires_in: None,
            token_type: None,
        };
        let value = serde_json::to_value(&tokens).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 1);
    }
}
