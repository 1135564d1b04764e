//! Route configuration and setup.

use crate::api_doc::ApiDoc;
use crate::auth::jwks::JwksVerifier;
use crate::auth::middleware::{auth_middleware, AuthState};
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use finvo_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = setup_auth_state(config)?;

    let public_routes = public_routes();
    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        Arc::new(auth_state),
        auth_middleware,
    ));

    // Base64 inflates the payload by roughly a third; leave headroom on top
    // of the decoded-size limit enforced in the upload handler.
    let body_limit = config.max_upload_size_bytes() * 2;

    let app = public_routes
        .merge(protected_routes)
        .merge(utoipa_rapidoc::RapiDoc::new("/openapi.json").path("/docs"))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/signup", post(handlers::account::signup))
        .route("/login", post(handlers::account::login))
        .route("/openapi.json", get(openapi_spec))
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload-image", post(handlers::upload::upload_image))
        .route(
            "/extract-invoice/{*file_name}",
            get(handlers::extract::extract_invoice),
        )
        .route("/reanalyze/{*file_name}", post(handlers::extract::reanalyze))
        .route("/my-invoices", get(handlers::invoices::my_invoices))
        .route("/latest-invoice", get(handlers::invoices::latest_invoice))
        .route(
            "/create-reminder",
            post(handlers::reminders::create_reminder),
        )
        .route("/get-reminders", get(handlers::reminders::get_reminders))
        .route(
            "/delete-reminder",
            post(handlers::reminders::delete_reminder),
        )
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins().iter().map(|o| o.parse()).collect();
        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

fn setup_auth_state(config: &Config) -> Result<AuthState, anyhow::Error> {
    let jwks_url = config
        .jwks_url()
        .ok_or_else(|| anyhow::anyhow!("JWKS_URL environment variable not set"))?
        .to_string();

    Ok(AuthState {
        verifier: Arc::new(JwksVerifier::new(jwks_url, None)),
    })
}
