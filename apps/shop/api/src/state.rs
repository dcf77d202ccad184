//! Shared application state.
//!
//! Services are built once from the pooled connection and shared behind
//! `Arc`s; every router clones what it needs.

use axum_helpers::{Gate, TokenIssuer};
use database::postgres::DatabaseConnection;
use domain_orders::{OrderService, PgOrderRepository};
use domain_products::{PgProductRepository, ProductCatalog, ProductService};
use domain_users::{AuthService, PgUserRepository};
use std::sync::Arc;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// PostgreSQL connection pool
    pub db: DatabaseConnection,
    /// Access gate shared by all guarded routes
    pub gate: Gate,
    pub auth: Arc<AuthService<PgUserRepository>>,
    pub products: Arc<ProductService<PgProductRepository>>,
    pub orders: Arc<OrderService<PgOrderRepository>>,
}

impl AppState {
    pub fn new(config: Config, db: DatabaseConnection) -> Self {
        let issuer = Arc::new(TokenIssuer::new(&config.jwt));

        let auth = Arc::new(
            AuthService::new(PgUserRepository::new(db.clone()), issuer.clone())
                .with_login_failure_policy(config.auth.login_failure_policy),
        );

        let mut gate = Gate::new(issuer);
        if config.auth.single_session {
            gate = gate.with_sessions(auth.clone());
        }

        let products = Arc::new(ProductService::new(PgProductRepository::new(db.clone())));
        let catalog: Arc<dyn ProductCatalog> = products.clone();
        let orders = Arc::new(OrderService::new(PgOrderRepository::new(db.clone()), catalog));

        Self {
            config,
            db,
            gate,
            auth,
            products,
            orders,
        }
    }
}
