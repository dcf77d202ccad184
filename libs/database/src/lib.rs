//! Database connectivity for the shop services.
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL through SeaORM, migrations, health checks
//! - `config` - `core_config::FromEnv` for [`postgres::PostgresConfig`]
//!
//! ```ignore
//! use database::postgres;
//! use migration::Migrator;
//!
//! let db = postgres::connect_from_config_with_retry(config, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "shop_api").await?;
//! ```
//!
//! The connection is built once at startup and handed to each repository;
//! nothing in this crate keeps a global client.

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
