//! Configuration module
//!
//! Environment-driven configuration for the API server and the reminder
//! sweeper. Collaborator endpoints (blob store, identity provider,
//! extraction service, SMTP relay) are all injected through here so no
//! component reads ambient globals.

use std::env;

use crate::error::AppError;

const DEFAULT_SERVER_PORT: u16 = 8000;
const DEFAULT_MAX_UPLOAD_SIZE_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_ALLOWED_EXTENSIONS: &str = "jpg,jpeg,png,pdf";

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    S3,
}

impl StorageBackend {
    fn parse(s: &str) -> Result<Self, AppError> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "s3" => Ok(StorageBackend::S3),
            other => Err(AppError::Internal(format!(
                "Unknown STORAGE_BACKEND '{}': expected 'local' or 's3'",
                other
            ))),
        }
    }
}

/// Application configuration, loaded once at process start.
#[derive(Clone, Debug)]
pub struct Config {
    server_port: u16,
    cors_origins: Vec<String>,
    environment: String,
    // Storage
    storage_backend: StorageBackend,
    s3_bucket: Option<String>,
    s3_region: Option<String>,
    s3_endpoint: Option<String>,
    local_storage_path: Option<String>,
    // Identity provider
    identity_base_url: Option<String>,
    identity_client_id: Option<String>,
    jwks_url: Option<String>,
    // Document extraction service
    extraction_url: Option<String>,
    // Email / reminder notifications
    email_enabled: bool,
    smtp_host: Option<String>,
    smtp_port: Option<u16>,
    smtp_user: Option<String>,
    smtp_password: Option<String>,
    smtp_from: Option<String>,
    smtp_tls: bool,
    // Upload limits
    max_upload_size_bytes: usize,
    allowed_extensions: Vec<String>,
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    env_opt(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_opt(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_list(key: &str, default: &str) -> Vec<String> {
    env_opt(key)
        .unwrap_or_else(|| default.to_string())
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    /// Load configuration from the environment (and `.env` when present).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let storage_backend =
            StorageBackend::parse(&env_opt("STORAGE_BACKEND").unwrap_or_else(|| "s3".to_string()))?;

        Ok(Config {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT),
            cors_origins: env_list("CORS_ORIGINS", "*"),
            environment: env_opt("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            storage_backend,
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION"),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            identity_base_url: env_opt("IDENTITY_BASE_URL"),
            identity_client_id: env_opt("IDENTITY_CLIENT_ID"),
            jwks_url: env_opt("JWKS_URL"),
            extraction_url: env_opt("EXTRACTION_URL"),
            email_enabled: env_bool("EMAIL_ENABLED", false),
            smtp_host: env_opt("SMTP_HOST"),
            smtp_port: env_opt("SMTP_PORT").and_then(|v| v.parse().ok()),
            smtp_user: env_opt("SMTP_USER"),
            smtp_password: env_opt("SMTP_PASSWORD"),
            smtp_from: env_opt("SMTP_FROM"),
            smtp_tls: env_bool("SMTP_TLS", true),
            max_upload_size_bytes: env_parse("MAX_UPLOAD_SIZE_BYTES", DEFAULT_MAX_UPLOAD_SIZE_BYTES),
            allowed_extensions: env_list("ALLOWED_EXTENSIONS", DEFAULT_ALLOWED_EXTENSIONS),
        })
    }

    /// Fail-fast validation of collaborator settings. Called at startup so a
    /// misconfigured process never begins serving requests.
    pub fn validate(&self) -> Result<(), AppError> {
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(AppError::Internal(
                        "S3_BUCKET is required when STORAGE_BACKEND=s3".to_string(),
                    ));
                }
                if self.s3_region.is_none() && self.s3_endpoint.is_none() {
                    return Err(AppError::Internal(
                        "S3_REGION or S3_ENDPOINT is required when STORAGE_BACKEND=s3".to_string(),
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(AppError::Internal(
                        "LOCAL_STORAGE_PATH is required when STORAGE_BACKEND=local".to_string(),
                    ));
                }
            }
        }
        if self.email_enabled && (self.smtp_host.is_none() || self.smtp_from.is_none()) {
            return Err(AppError::Internal(
                "SMTP_HOST and SMTP_FROM are required when EMAIL_ENABLED=true".to_string(),
            ));
        }
        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        matches!(self.environment.to_lowercase().as_str(), "production" | "prod")
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.local_storage_path.as_deref()
    }

    pub fn identity_base_url(&self) -> Option<&str> {
        self.identity_base_url.as_deref()
    }

    pub fn identity_client_id(&self) -> Option<&str> {
        self.identity_client_id.as_deref()
    }

    pub fn jwks_url(&self) -> Option<&str> {
        self.jwks_url.as_deref()
    }

    pub fn extraction_url(&self) -> Option<&str> {
        self.extraction_url.as_deref()
    }

    pub fn email_enabled(&self) -> bool {
        self.email_enabled
    }

    pub fn smtp_host(&self) -> Option<&str> {
        self.smtp_host.as_deref()
    }

    pub fn smtp_port(&self) -> Option<u16> {
        self.smtp_port
    }

    pub fn smtp_user(&self) -> Option<&str> {
        self.smtp_user.as_deref()
    }

    pub fn smtp_password(&self) -> Option<&str> {
        self.smtp_password.as_deref()
    }

    pub fn smtp_from(&self) -> Option<&str> {
        self.smtp_from.as_deref()
    }

    pub fn smtp_tls(&self) -> bool {
        self.smtp_tls
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.max_upload_size_bytes
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!(StorageBackend::parse("local").unwrap(), StorageBackend::Local);
        assert_eq!(StorageBackend::parse("S3").unwrap(), StorageBackend::S3);
        assert!(StorageBackend::parse("gcs").is_err());
    }

    #[test]
    fn test_env_list_splits_and_lowercases() {
        assert_eq!(
            env_list("FINVO_TEST_UNSET_LIST", "JPG, png ,,pdf"),
            vec!["jpg", "png", "pdf"]
        );
    }
}
