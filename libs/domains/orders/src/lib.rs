//! Orders Domain
//!
//! Per-user shopping cart and its consolidation into immutable orders.
//!
//! ```text
//! ┌──────────────┐
//! │   Handlers   │  ← /users/cart, /users/orders
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐      ┌────────────────┐
//! │ OrderService │ ───► │ ProductCatalog │  (domain_products)
//! └──────┬───────┘      └────────────────┘
//!        │
//! ┌──────▼───────┐
//! │  Repository  │  ← in-memory or PostgreSQL (transactional)
//! └──────────────┘
//! ```
//!
//! Cart lines are unique per `(user, product)`. Adding a product that is
//! already in the cart increases the quantity and keeps the price captured
//! on the first add. Checkout copies every line into an order and empties
//! the cart in a single transaction.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{OrderError, OrderResult};
pub use handlers::ApiDoc;
pub use models::{AddToCart, AddToCartOutcome, CartLine, Order, OrderLine, OrderWithLines};
pub use postgres::PgOrderRepository;
pub use repository::{InMemoryOrderRepository, OrderRepository};
pub use service::OrderService;
