//! # Axum Helpers
//!
//! Shared HTTP plumbing for the shop services.
//!
//! - **[`auth`]**: session tokens, roles and the per-operation access gate
//! - **[`server`]**: router assembly, health probes, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: `AppError` and the standard error body
//! - **[`extractors`]**: `UuidPath`, `ValidatedJson`
//! - **[`audit`]**: structured audit events
//!
//! ```ignore
//! let router = create_router::<ApiDoc>(api_routes, &server_config)?
//!     .merge(health_router(app_info!()));
//! create_production_app(router, &server_config, Duration::from_secs(30), cleanup).await?;
//! ```

pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{
    Access, AuthError, Gate, Identity, JwtConfig, Role, SessionClaims, SessionRegistry,
    TokenIssuer, guard,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{UuidPath, ValidatedJson};

pub use audit::{AuditEvent, AuditOutcome};
