//! PostgreSQL connection management, migrations and health checks

mod config;
mod connector;
mod health;

pub use config::PostgresConfig;
pub use connector::{connect_from_config, connect_from_config_with_retry, run_migrations};
pub use health::check_health;

pub use sea_orm::{ConnectOptions, DatabaseConnection, DbErr};
pub use sea_orm_migration::MigratorTrait;

use sea_orm::SqlErr;

/// True when the statement was rejected by a unique index or constraint.
///
/// Repositories use this to turn a lost insert race into a domain conflict.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// True when a referenced row does not exist (or is still referenced on delete).
pub fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&DbErr::RecordNotFound("user".into())));
        assert!(!is_unique_violation(&DbErr::Custom("boom".into())));
        assert!(!is_foreign_key_violation(&DbErr::Custom("boom".into())));
    }
}
