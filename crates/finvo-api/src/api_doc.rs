//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use finvo_core::models;
use finvo_services::identity;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Finvo API",
        version = "0.1.0",
        description = "Invoice upload backend: authenticated users upload invoice documents, a managed extraction service pulls out fields such as the due date, and payment reminders are scheduled and swept by a periodic job."
    ),
    paths(
        handlers::health::health,
        handlers::account::signup,
        handlers::account::login,
        handlers::upload::upload_image,
        handlers::extract::extract_invoice,
        handlers::extract::reanalyze,
        handlers::invoices::my_invoices,
        handlers::invoices::latest_invoice,
        handlers::reminders::create_reminder,
        handlers::reminders::get_reminders,
        handlers::reminders::delete_reminder,
    ),
    components(schemas(
        error::ErrorResponse,
        handlers::health::HealthResponse,
        handlers::account::CredentialsRequest,
        handlers::account::SignupResponse,
        handlers::account::LoginResponse,
        handlers::upload::UploadImageRequest,
        handlers::reminders::CreateReminderRequest,
        handlers::reminders::DeleteReminderRequest,
        identity::AuthTokens,
        models::UploadResponse,
        models::InvoiceListResponse,
        models::LatestInvoiceResponse,
        models::ExtractionResponse,
        models::ReminderRecord,
        models::ReminderListResponse,
        models::CreateReminderResponse,
        models::DeleteReminderResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "account", description = "Signup and login"),
        (name = "invoices", description = "Invoice upload, listing, and extraction"),
        (name = "reminders", description = "Payment reminder management"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;
