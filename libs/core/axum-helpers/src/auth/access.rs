use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

/// Role carried by every user and every session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Access rule attached to an operation.
///
/// `public` skips authentication entirely. Otherwise a valid token is
/// required and, when `roles` is non-empty, its role must be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub public: bool,
    pub roles: &'static [Role],
}

impl Access {
    pub const PUBLIC: Access = Access {
        public: true,
        roles: &[],
    };

    pub const AUTHENTICATED: Access = Access {
        public: false,
        roles: &[],
    };

    pub const ADMIN: Access = Access {
        public: false,
        roles: &[Role::Admin],
    };

    pub const fn roles(roles: &'static [Role]) -> Self {
        Access {
            public: false,
            roles,
        }
    }

    pub fn admits(&self, role: Role) -> bool {
        self.roles.is_empty() || self.roles.contains(&role)
    }
}

/// Caller identity resolved by the gate and stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
