//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, turnover};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Turnover Thermostat API",
        version = "0.1.0",
        description = "Booking-driven thermostat set points for a short-term rental",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        health::health_check,
        turnover::adjust_temp,
    ),
    components(
        schemas(
            health::HealthResponse,
            crate::models::turnover::TurnoverResponse,
            crate::models::turnover::TurnoverStatus,
            crate::models::thermostat::ActionAttempt,
            crate::models::thermostat::DispatchFailure,
            crate::models::thermostat::DispatchErrorCode,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "turnover", description = "Scheduler webhook")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
