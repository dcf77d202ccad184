use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the `bearer_auth` scheme referenced by guarded operations
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
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

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse, axum_helpers::Role)
    ),
    info(
        title = "Shop API",
        version = "0.1.0",
        description = "Accounts, product likes, shopping cart and orders"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    modifiers(&BearerAuth),
    nest(
        (path = "/auth", api = domain_users::handlers::ApiDoc),
        (path = "/products", api = domain_products::ApiDoc),
        (path = "/users", api = domain_orders::ApiDoc)
    )
)]
pub struct ApiDoc;
