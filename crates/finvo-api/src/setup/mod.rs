//! Application setup and initialization
//!
//! All startup wiring lives here rather than in main.rs so tests can build
//! the same router around mock collaborators.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use finvo_core::Config;
use finvo_services::{HttpDocumentAnalyzer, HttpIdentityProvider};
use finvo_storage::create_blob_store;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry();
    tracing::info!("Configuration loaded and validated successfully");

    let store = create_blob_store(&config)
        .await
        .context("Failed to initialize blob store")?;

    let identity_base_url = config
        .identity_base_url()
        .context("IDENTITY_BASE_URL is required")?
        .to_string();
    let identity_client_id = config
        .identity_client_id()
        .context("IDENTITY_CLIENT_ID is required")?
        .to_string();
    let identity = Arc::new(HttpIdentityProvider::new(
        identity_base_url,
        identity_client_id,
    ));

    let extraction_url = config
        .extraction_url()
        .context("EXTRACTION_URL is required")?
        .to_string();
    let analyzer = Arc::new(HttpDocumentAnalyzer::new(extraction_url));

    let state = Arc::new(AppState::new(config.clone(), store, identity, analyzer));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
