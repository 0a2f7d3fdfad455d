use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const AUTH_TAG: &str = "Auth";
pub const USER_TAG: &str = "Users";
pub const DOCUMENT_TAG: &str = "Documents";
pub const CHECK_TAG: &str = "Checks";
pub const PAYMENT_TAG: &str = "Payments";
pub const HEALTH_TAG: &str = "Health";
pub const METRICS_TAG: &str = "Metrics";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Patent Guard",
        description = "Patent similarity checking: documents, checks and payments",
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::models::SimilarityMatch,
        )
    ),
    tags(
        (name = AUTH_TAG, description = "Registration, login and tokens"),
        (name = USER_TAG, description = "Profile and user administration"),
        (name = DOCUMENT_TAG, description = "Document upload and per-document checks"),
        (name = CHECK_TAG, description = "Quick checks and check history"),
        (name = PAYMENT_TAG, description = "Payment intents, refunds and provider webhooks"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = METRICS_TAG, description = "Prometheus metrics"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token from POST /api/auth/login"))
                        .build(),
                ),
            )
        }
    }
}
