use axum::Router;

pub mod health;

/// API routes without the `/api` prefix; `create_router` adds it.
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new()
        .nest(
            "/auth",
            domain_users::handlers::router(state.auth.clone(), &state.gate),
        )
        .nest(
            "/products",
            domain_products::handlers::router(state.products.clone(), &state.gate),
        )
        .nest(
            "/users",
            domain_orders::handlers::router(state.orders.clone(), &state.gate),
        )
}

/// `/ready` with a real database check, merged next to `/health`.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
