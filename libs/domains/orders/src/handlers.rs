use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    Access, AuditEvent, AuditOutcome, Gate, Identity, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    guard,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::OrderResult;
use crate::models::{AddToCart, AddToCartOutcome, CartLine, Order, OrderLine, OrderWithLines};
use crate::repository::OrderRepository;
use crate::service::OrderService;

/// OpenAPI documentation for cart and order endpoints
#[derive(OpenApi)]
#[openapi(
    paths(add_to_cart, view_cart, buy_cart, find_my_order, find_all_orders),
    components(
        schemas(AddToCart, AddToCartOutcome, CartLine, Order, OrderLine, OrderWithLines),
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
        (name = "Orders", description = "Shopping cart and orders")
    )
)]
pub struct ApiDoc;

/// Routes mounted under `/users`
pub fn router<R: OrderRepository + 'static>(service: Arc<OrderService<R>>, gate: &Gate) -> Router {
    let authenticated = guard(
        Router::new()
            .route("/cart", get(view_cart).post(add_to_cart))
            .route("/cart/checkout", post(buy_cart))
            .route("/orders/{id}", get(find_my_order)),
        gate,
        Access::AUTHENTICATED,
    );

    let admin = guard(
        Router::new().route("/orders", get(find_all_orders)),
        gate,
        Access::ADMIN,
    );

    authenticated.merge(admin).with_state(service)
}

/// Add a product to the caller's cart
#[utoipa::path(
    post,
    path = "/cart",
    tag = "Orders",
    request_body = AddToCart,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cart line inserted or merged", body = AddToCartOutcome),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_to_cart<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    identity: Identity,
    ValidatedJson(input): ValidatedJson<AddToCart>,
) -> OrderResult<Json<AddToCartOutcome>> {
    let outcome = service.add_to_cart(identity.user_id, input).await?;
    Ok(Json(outcome))
}

/// List the caller's cart lines
#[utoipa::path(
    get,
    path = "/cart",
    tag = "Orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cart lines", body = Vec<CartLine>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn view_cart<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    identity: Identity,
) -> OrderResult<Json<Vec<CartLine>>> {
    let lines = service.view_cart(identity.user_id).await?;
    Ok(Json(lines))
}

/// Check out the whole cart as one order
#[utoipa::path(
    post,
    path = "/cart/checkout",
    tag = "Orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Order placed", body = OrderWithLines),
        (status = 401, response = UnauthorizedResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn buy_cart<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    identity: Identity,
    headers: HeaderMap,
) -> OrderResult<impl IntoResponse> {
    let placed = service.buy_cart(identity.user_id).await?;

    AuditEvent::new(Some(identity.user_id), "order.place", AuditOutcome::Success)
        .with_resource(format!("order:{}", placed.order.id))
        .with_request_headers(&headers)
        .with_details(serde_json::json!({
            "total_amount": placed.order.total_amount,
            "lines": placed.lines.len(),
        }))
        .log();

    Ok((StatusCode::CREATED, Json(placed)))
}

/// One of the caller's own orders
#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "Orders",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order found", body = OrderWithLines),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn find_my_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    identity: Identity,
    UuidPath(id): UuidPath,
) -> OrderResult<Json<OrderWithLines>> {
    let order = service.find_order(identity.user_id, id).await?;
    Ok(Json(order))
}

/// Every order in the system
#[utoipa::path(
    get,
    path = "/orders",
    tag = "Orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All orders, newest first", body = Vec<OrderWithLines>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn find_all_orders<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
) -> OrderResult<Json<Vec<OrderWithLines>>> {
    let orders = service.find_all_orders().await?;
    Ok(Json(orders))
}
