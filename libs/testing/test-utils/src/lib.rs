//! Shared test utilities for domain testing
//!
//! - `TestDatabase`: PostgreSQL container with migrations applied (feature: "postgres")
//! - `TestDataBuilder`: deterministic test data generation
//! - `TestAuth`: token issuer and bearer headers for guarded routes
//! - `assertions`: custom assertion helpers
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let username = builder.name("user", "main");
//!     let email = builder.email("main");
//! }
//! ```
//!
//! Tests that need Docker are marked `#[ignore]`; run them with
//! `cargo test -- --ignored`.

use axum_helpers::{Gate, JwtConfig, Role, TokenIssuer};
use std::sync::Arc;
use uuid::Uuid;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Builder for test data with deterministic randomization
///
/// Names derived from the test name keep parallel tests against one
/// database from colliding on unique columns.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_add_to_cart");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Deterministic user ID
    pub fn user_id(&self) -> Uuid {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..16].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes)
    }

    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("my_test");
    /// let name = builder.name("user", "main");
    /// assert!(name.starts_with("test-user-"));
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    pub fn email(&self, suffix: &str) -> String {
        format!("{}@example.com", self.name("user", suffix))
    }
}

const TEST_JWT_SECRET: &str = "test-utils-secret-with-at-least-32-characters";

/// Token issuer plus a matching gate for handler tests
#[derive(Clone)]
pub struct TestAuth {
    pub issuer: Arc<TokenIssuer>,
    pub gate: Gate,
}

impl TestAuth {
    pub fn new() -> Self {
        let config = JwtConfig::new(TEST_JWT_SECRET).expect("test secret is long enough");
        let issuer = Arc::new(TokenIssuer::new(&config));
        let gate = Gate::new(issuer.clone());
        Self { issuer, gate }
    }

    /// Signed token for an arbitrary user
    pub fn token(&self, user_id: Uuid, role: Role) -> String {
        self.issuer
            .issue(user_id, "test-user", role)
            .expect("failed to sign test token")
            .token
    }

    /// `Authorization` header value for [`TestAuth::token`]
    pub fn bearer(&self, user_id: Uuid, role: Role) -> String {
        format!("Bearer {}", self.token(user_id, role))
    }
}

impl Default for TestAuth {
    fn default() -> Self {
        Self::new()
    }
}

/// Test assertion helpers
pub mod assertions {
    use uuid::Uuid;

    /// Assert that two UUIDs are equal with a nice error message
    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
