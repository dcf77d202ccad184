//! Products Domain
//!
//! Product catalog and per-user reactions ("likes").
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /products endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← validation, one reaction per (user, product)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← in-memory or PostgreSQL
//! └─────────────┘
//! ```
//!
//! [`ProductCatalog`] is the narrow view other domains use to check that a
//! product exists.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{CreateProduct, MAX_AMOUNT, PRICE_SCALE, Product, ProductView, Reaction, validate_price};
pub use postgres::PgProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::{ProductCatalog, ProductService};
