//! Users Domain
//!
//! Registration, login and session bookkeeping.
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /auth endpoints, access rules per route
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ AuthService │  ← credential checks, token issuance, admin bootstrap
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← in-memory or PostgreSQL
//! └─────────────┘
//! ```
//!
//! ```rust,ignore
//! use domain_users::{AuthService, InMemoryUserRepository, handlers};
//!
//! let service = Arc::new(AuthService::new(InMemoryUserRepository::new(), issuer));
//! let router = handlers::router(service, &gate);
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod password;
pub mod postgres;
pub mod repository;
pub mod service;

pub use axum_helpers::Role;
pub use config::{AdminBootstrap, AuthConfig};
pub use error::{UserError, UserResult};
pub use models::{LoginRequest, LoginResponse, NewUser, RegisterUser, User, UserResponse};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::{AuthService, LoginFailurePolicy};
