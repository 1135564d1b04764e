//! RS256 JWT verification with JWKS key rotation
//!
//! Access tokens are signed by the identity provider with rotating RSA keys
//! published at a JWKS endpoint. Keys are cached per `kid` with a TTL so the
//! endpoint is only re-fetched on rotation or expiry.

use crate::auth::models::Claims;
use chrono::{DateTime, Utc};
use finvo_core::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// JWKS (JSON Web Key Set) structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

/// JSON Web Key structure (RSA only; the identity provider signs with RS256)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(rename = "kty")]
    pub key_type: String,
    #[serde(rename = "kid")]
    pub key_id: Option<String>,
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    #[serde(rename = "alg")]
    pub algorithm: Option<String>,
    #[serde(rename = "n")]
    pub modulus: Option<String>,
    #[serde(rename = "e")]
    pub exponent: Option<String>,
}

/// Cached public key with expiration
#[derive(Clone)]
struct CachedKey {
    key: DecodingKey,
    expires_at: DateTime<Utc>,
}

/// Token verifier with RS256 support and JWKS key rotation
pub struct JwksVerifier {
    jwks_url: String,
    cache: Arc<RwLock<HashMap<String, CachedKey>>>,
    cache_ttl_seconds: i64,
}

impl JwksVerifier {
    /// Create a new verifier.
    ///
    /// # Arguments
    /// * `jwks_url` - URL to fetch JWKS (e.g., "https://your-auth-domain/.well-known/jwks.json")
    /// * `cache_ttl_seconds` - How long to cache keys (default: 3600 = 1 hour)
    pub fn new(jwks_url: String, cache_ttl_seconds: Option<i64>) -> Self {
        Self {
            jwks_url,
            cache: Arc::new(RwLock::new(HashMap::new())),
            cache_ttl_seconds: cache_ttl_seconds.unwrap_or(3600),
        }
    }

    /// Fetch JWKS from the configured URL
    async fn fetch_jwks(&self) -> Result<Jwks, AppError> {
        let response = reqwest::get(&self.jwks_url)
            .await
            .map_err(|e| AppError::Unauthorized(format!("Failed to fetch JWKS: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized(format!(
                "JWKS endpoint returned error: {}",
                response.status()
            )));
        }

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| AppError::Unauthorized(format!("Failed to parse JWKS: {}", e)))?;

        Ok(jwks)
    }

    /// Convert JWK to DecodingKey
    fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AppError> {
        if jwk.key_type != "RSA" {
            return Err(AppError::Unauthorized(format!(
                "Unsupported key type: {}",
                jwk.key_type
            )));
        }
        let n = jwk
            .modulus
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("RSA key missing modulus".to_string()))?;
        let e = jwk
            .exponent
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("RSA key missing exponent".to_string()))?;

        // jsonwebtoken's built-in RSA support handles base64url decoding
        DecodingKey::from_rsa_components(n, e)
            .map_err(|e| AppError::Unauthorized(format!("Failed to create RSA key: {}", e)))
    }

    /// Get decoding key for a given key ID, with caching
    async fn get_decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AppError> {
        let cache_key = kid.unwrap_or("default").to_string();

        // Check cache first
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(&cache_key) {
                if cached.expires_at > Utc::now() {
                    return Ok(cached.key.clone());
                }
            }
        }

        // Cache miss or expired - fetch fresh JWKS
        let jwks = self.fetch_jwks().await?;

        // Find the key by kid, or use the first key if no kid specified
        let jwk = if let Some(kid) = kid {
            jwks.keys
                .iter()
                .find(|k| k.key_id.as_ref().map(|k| k == kid).unwrap_or(false))
                .ok_or_else(|| {
                    AppError::Unauthorized(format!("Key ID {} not found in JWKS", kid))
                })?
        } else {
            jwks.keys
                .first()
                .ok_or_else(|| AppError::Unauthorized("No keys found in JWKS".to_string()))?
        };

        let decoding_key = Self::jwk_to_decoding_key(jwk)?;

        // Cache the key
        {
            let mut cache = self.cache.write().await;
            cache.insert(
                cache_key,
                CachedKey {
                    key: decoding_key.clone(),
                    expires_at: Utc::now() + chrono::Duration::seconds(self.cache_ttl_seconds),
                },
            );
        }

        Ok(decoding_key)
    }

    /// Validate and decode an access token.
    ///
    /// Beyond signature and expiry checks, the token must carry
    /// `token_use = "access"`; id tokens are not accepted for API calls.
    pub async fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token header: {}", e)))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Unauthorized(format!(
                "Unsupported algorithm: {:?}. Supported: RS256",
                header.alg
            )));
        }

        let decoding_key = self.get_decoding_key(header.kid.as_deref()).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AppError::Unauthorized("Invalid token issuer".to_string())
                }
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => {
                    AppError::Unauthorized("Token is not yet valid (nbf)".to_string())
                }
                _ => AppError::Unauthorized(format!("Invalid or expired token: {}", e)),
            }
        })?;

        let claims = token_data.claims;
        if claims.token_use.as_deref() != Some("access") {
            return Err(AppError::Unauthorized(
                "Token is not an access token".to_string(),
            ));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwk_requires_rsa_components() {
        let jwk = Jwk {
            key_type: "RSA".to_string(),
            key_id: Some("k1".to_string()),
            key_use: Some("sig".to_string()),
            algorithm: Some("RS256".to_string()),
            modulus: None,
            exponent: Some("AQAB".to_string()),
        };
        assert!(JwksVerifier::jwk_to_decoding_key(&jwk).is_err());
    }

    #[test]
    fn test_non_rsa_key_type_is_rejected() {
        let jwk = Jwk {
            key_type: "EC".to_string(),
            key_id: None,
            key_use: None,
            algorithm: None,
            modulus: None,
            exponent: None,
        };
        match JwksVerifier::jwk_to_decoding_key(&jwk) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("Unsupported key type")),
            other => panic!("Expected Unauthorized, got {:?}", other.map(|_| ())),
        }
    }
}
