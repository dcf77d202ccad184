//! HTTP middleware shared by every service

pub mod cors;
pub mod security;

pub use cors::cors_layer_from_origins;
pub use security::security_headers;
