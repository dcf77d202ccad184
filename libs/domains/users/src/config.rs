use core_config::{ConfigError, FromEnv, env_flag, env_optional, env_or_default};
use std::fmt;

use crate::models::RegisterUser;
use crate::service::LoginFailurePolicy;

/// Credentials for the admin account created at startup
#[derive(Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl From<AdminBootstrap> for RegisterUser {
    fn from(admin: AdminBootstrap) -> Self {
        RegisterUser {
            username: admin.username,
            password: admin.password,
            email: admin.email,
            first_name: admin.first_name,
            last_name: admin.last_name,
        }
    }
}

/// Authentication settings.
///
/// - `AUTH_GENERIC_LOGIN_ERRORS` (default false): report unknown users as bad credentials
/// - `AUTH_SINGLE_SESSION` (default false): only the latest login token is accepted
/// - `ADMIN_USERNAME`, `ADMIN_EMAIL`, `ADMIN_PASSWORD`: all or none
/// - `ADMIN_FIRST_NAME`, `ADMIN_LAST_NAME` (optional)
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub login_failure_policy: LoginFailurePolicy,
    pub single_session: bool,
    pub admin: Option<AdminBootstrap>,
}

fn admin_from_env() -> Result<Option<AdminBootstrap>, ConfigError> {
    let keys = ["ADMIN_USERNAME", "ADMIN_EMAIL", "ADMIN_PASSWORD"];
    let values: Vec<Option<String>> = keys.iter().map(|k| env_optional(k)).collect();

    if values.iter().all(Option::is_none) {
        return Ok(None);
    }

    match (&values[0], &values[1], &values[2]) {
        (Some(username), Some(email), Some(password)) => Ok(Some(AdminBootstrap {
            username: username.clone(),
            email: email.clone(),
            password: password.clone(),
            first_name: env_or_default("ADMIN_FIRST_NAME", "Admin"),
            last_name: env_or_default("ADMIN_LAST_NAME", "Account"),
        })),
        _ => {
            let missing = keys
                .iter()
                .zip(&values)
                .find(|(_, v)| v.is_none())
                .map(|(k, _)| k.to_string())
                .unwrap_or_default();
            Err(ConfigError::MissingEnvVar(missing))
        }
    }
}

impl FromEnv for AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let login_failure_policy = if env_flag("AUTH_GENERIC_LOGIN_ERRORS", false)? {
            LoginFailurePolicy::Generic
        } else {
            LoginFailurePolicy::Distinct
        };

        Ok(Self {
            login_failure_policy,
            single_session: env_flag("AUTH_SINGLE_SESSION", false)?,
            admin: admin_from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KEYS: [&str; 5] = [
        "AUTH_GENERIC_LOGIN_ERRORS",
        "AUTH_SINGLE_SESSION",
        "ADMIN_USERNAME",
        "ADMIN_EMAIL",
        "ADMIN_PASSWORD",
    ];

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(ALL_KEYS, || {
            let config = AuthConfig::from_env().unwrap();
            assert_eq!(config.login_failure_policy, LoginFailurePolicy::Distinct);
            assert!(!config.single_session);
            assert!(config.admin.is_none());
        });
    }

    #[test]
    fn test_flags_and_admin() {
        temp_env::with_vars(
            [
                ("AUTH_GENERIC_LOGIN_ERRORS", Some("true")),
                ("AUTH_SINGLE_SESSION", Some("1")),
                ("ADMIN_USERNAME", Some("admin")),
                ("ADMIN_EMAIL", Some("admin@example.com")),
                ("ADMIN_PASSWORD", Some("change-me")),
            ],
            || {
                let config = AuthConfig::from_env().unwrap();
                assert_eq!(config.login_failure_policy, LoginFailurePolicy::Generic);
                assert!(config.single_session);
                let admin = config.admin.unwrap();
                assert_eq!(admin.username, "admin");
                assert!(!format!("{:?}", admin).contains("change-me"));
            },
        );
    }

    #[test]
    fn test_partial_admin_names_missing_key() {
        temp_env::with_vars(
            [
                ("ADMIN_USERNAME", Some("admin")),
                ("ADMIN_EMAIL", None),
                ("ADMIN_PASSWORD", Some("change-me")),
            ],
            || {
                let err = AuthConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("ADMIN_EMAIL"));
            },
        );
    }
}
