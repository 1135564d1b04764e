//! Document extraction client.
//!
//! The extraction service reads a stored document by its storage key and
//! returns a mapping of field names to values. The mapping is opaque here;
//! only the reminder policy inspects individual fields, and it does so with
//! explicit optional access.

use std::collections::BTreeMap;

use async_trait::async_trait;
use finvo_core::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Document extraction contract.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Run extraction on a stored document and return the field mapping.
    async fn analyze(&self, storage_key: &str) -> Result<BTreeMap<String, Value>, AppError>;
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    key: &'a str,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    fields: BTreeMap<String, Value>,
}

/// HTTP implementation against the managed extraction service.
#[derive(Clone)]
pub struct HttpDocumentAnalyzer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDocumentAnalyzer {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DocumentAnalyzer for HttpDocumentAnalyzer {
    async fn analyze(&self, storage_key: &str) -> Result<BTreeMap<String, Value>, AppError> {
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(format!("{}/analyze", self.base_url))
            .json(&AnalyzeRequest { key: storage_key })
            .send()
            .await
            .map_err(|e| AppError::Extraction(format!("Analyze request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Extraction(format!(
                "Extraction service returned {} for {}",
                status, storage_key
            )));
        }

        let body: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| AppError::Extraction(format!("Malformed analyze response: {}", e)))?;

        tracing::info!(
            key = %storage_key,
            fields = body.fields.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Document extraction complete"
        );

        Ok(body.fields)
    }
}
