//! Session tokens and per-operation authorization.
//!
//! ```ignore
//! use axum_helpers::auth::{Access, Gate, JwtConfig, TokenIssuer, guard};
//! use core_config::FromEnv;
//!
//! let issuer = Arc::new(TokenIssuer::new(&JwtConfig::from_env()?));
//! let gate = Gate::new(issuer);
//!
//! let admin_routes = guard(Router::new().route("/orders", get(list)), &gate, Access::ADMIN);
//! ```

pub mod access;
pub mod config;
pub mod gate;
pub mod jwt;

pub use access::{Access, Identity, Role};
pub use config::JwtConfig;
pub use gate::{AuthError, Gate, SessionRegistry, authenticate, authorize, bearer_token, guard};
pub use jwt::{DEFAULT_TOKEN_TTL_SECS, IssuedToken, SessionClaims, TokenError, TokenIssuer};
