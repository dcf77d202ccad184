use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    Access, Gate, Identity, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    guard,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ProductResult;
use crate::models::{CreateProduct, Product, ProductView, Reaction};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for the products API
#[derive(OpenApi)]
#[openapi(
    paths(create_product, get_product, like_product),
    components(
        schemas(Product, ProductView, CreateProduct, Reaction),
        responses(
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalog and likes")
    )
)]
pub struct ApiDoc;

pub fn router<R: ProductRepository + 'static>(
    service: Arc<ProductService<R>>,
    gate: &Gate,
) -> Router {
    let public = guard(
        Router::new().route("/{id}", get(get_product)),
        gate,
        Access::PUBLIC,
    );

    let authenticated = guard(
        Router::new().route("/{id}/like", post(like_product)),
        gate,
        Access::AUTHENTICATED,
    );

    let admin = guard(
        Router::new().route("/", post(create_product)),
        gate,
        Access::ADMIN,
    );

    public
        .merge(authenticated)
        .merge(admin)
        .with_state(service)
}

/// Add a product to the catalog
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProduct,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product with its like count
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductView),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<ProductView>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Like a product as the calling user
#[utoipa::path(
    post,
    path = "/{id}/like",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Reaction recorded", body = Reaction),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn like_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    identity: Identity,
    UuidPath(id): UuidPath,
) -> ProductResult<impl IntoResponse> {
    let reaction = service.like_product(identity.user_id, id).await?;
    Ok((StatusCode::CREATED, Json(reaction)))
}
