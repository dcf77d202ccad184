use async_trait::async_trait;
use axum_helpers::{Role, SessionRegistry, TokenIssuer};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::config::AdminBootstrap;
use crate::error::{UserError, UserResult};
use crate::models::{LoginRequest, LoginResponse, NewUser, RegisterUser, User};
use crate::password::{hash_password, verify_password};
use crate::repository::UserRepository;

/// How login reports an unknown username
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginFailurePolicy {
    /// Unknown user is `NotFound`, wrong password is `InvalidCredentials`
    #[default]
    Distinct,
    /// Both are `InvalidCredentials`
    Generic,
}

/// Registration, login and session checks
pub struct AuthService<R: UserRepository> {
    repository: Arc<R>,
    issuer: Arc<TokenIssuer>,
    policy: LoginFailurePolicy,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repository: R, issuer: Arc<TokenIssuer>) -> Self {
        Self {
            repository: Arc::new(repository),
            issuer,
            policy: LoginFailurePolicy::default(),
        }
    }

    pub fn with_login_failure_policy(mut self, policy: LoginFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Verify credentials and issue a session token.
    ///
    /// The token is stored as the user's current session before it is returned.
    pub async fn login(&self, input: LoginRequest) -> UserResult<LoginResponse> {
        let user = match self.repository.find_by_username(&input.username).await? {
            Some(user) => user,
            None => {
                return Err(match self.policy {
                    LoginFailurePolicy::Distinct => UserError::NotFound(input.username),
                    LoginFailurePolicy::Generic => UserError::InvalidCredentials,
                });
            }
        };

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        let issued = self
            .issuer
            .issue(user.id, &user.username, user.role)
            .map_err(|e| UserError::Token(e.to_string()))?;

        self.repository.update_token(user.id, &issued.token).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok(LoginResponse {
            access_token: issued.token,
            token_type: "Bearer".to_string(),
            expires_in: self.issuer.ttl_seconds(),
        })
    }

    pub async fn register(&self, input: RegisterUser) -> UserResult<User> {
        self.register_with_role(input, Role::User).await
    }

    pub async fn register_admin(&self, input: RegisterUser) -> UserResult<User> {
        self.register_with_role(input, Role::Admin).await
    }

    /// Email is checked before username; the store's unique indexes settle races.
    async fn register_with_role(&self, input: RegisterUser, role: Role) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        if self.repository.find_by_email(&input.email).await?.is_some() {
            return Err(UserError::AlreadyExists("email"));
        }
        if self
            .repository
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(UserError::AlreadyExists("username"));
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .repository
            .create(NewUser {
                username: input.username,
                email: input.email,
                first_name: input.first_name,
                last_name: input.last_name,
                password_hash,
                role,
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %role, "Registered user");
        Ok(user)
    }

    /// Create the configured admin unless that username already exists.
    ///
    /// Returns the new admin, or `None` when nothing was created.
    pub async fn ensure_admin(&self, admin: &AdminBootstrap) -> UserResult<Option<User>> {
        if let Some(existing) = self.repository.find_by_username(&admin.username).await? {
            if existing.role != Role::Admin {
                tracing::warn!(
                    username = %admin.username,
                    "Bootstrap admin username belongs to a non-admin user"
                );
            }
            return Ok(None);
        }

        match self.register_admin(admin.clone().into()).await {
            Ok(user) => Ok(Some(user)),
            // Another instance won the race
            Err(UserError::AlreadyExists(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Whether `token` is the last one issued to the user
    pub async fn is_current_session(&self, user_id: Uuid, token: &str) -> UserResult<bool> {
        let user = self.repository.find_by_id(user_id).await?;
        Ok(user.and_then(|u| u.current_session_token).as_deref() == Some(token))
    }
}

#[async_trait]
impl<R: UserRepository + 'static> SessionRegistry for AuthService<R> {
    async fn is_current(&self, user_id: Uuid, token: &str) -> eyre::Result<bool> {
        Ok(self.is_current_session(user_id, token).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use axum_helpers::JwtConfig;

    fn issuer() -> Arc<TokenIssuer> {
        Arc::new(TokenIssuer::new(
            &JwtConfig::new("users-service-test-secret-32-characters").unwrap(),
        ))
    }

    fn register_input(username: &str, email: &str) -> RegisterUser {
        RegisterUser {
            username: username.into(),
            password: "pa55word".into(),
            email: email.into(),
            first_name: "Test".into(),
            last_name: "User".into(),
        }
    }

    fn login_input(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_login_token_carries_stored_role() {
        let issuer = issuer();
        let service = AuthService::new(InMemoryUserRepository::new(), issuer.clone());
        let admin = service
            .register_admin(register_input("root", "root@example.com"))
            .await
            .unwrap();

        let response = service.login(login_input("root", "pa55word")).await.unwrap();
        let claims = issuer.verify(&response.access_token).unwrap();

        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.sub, admin.id);
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_login_unknown_user_is_not_found() {
        let service = AuthService::new(InMemoryUserRepository::new(), issuer());
        let err = service.login(login_input("ghost", "x")).await.unwrap_err();
        assert!(matches!(err, UserError::NotFound(name) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_login_unknown_user_with_generic_policy() {
        let service = AuthService::new(InMemoryUserRepository::new(), issuer())
            .with_login_failure_policy(LoginFailurePolicy::Generic);
        let err = service.login(login_input("ghost", "x")).await.unwrap_err();
        assert!(matches!(err, UserError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_invalid_credentials() {
        let service = AuthService::new(InMemoryUserRepository::new(), issuer());
        service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();

        let err = service.login(login_input("alice", "nope")).await.unwrap_err();
        assert!(matches!(err, UserError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_register_same_email_twice_regardless_of_username() {
        let service = AuthService::new(InMemoryUserRepository::new(), issuer());
        service
            .register(register_input("alice", "shared@example.com"))
            .await
            .unwrap();

        let err = service
            .register(register_input("bob", "shared@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::AlreadyExists("email")));
    }

    #[tokio::test]
    async fn test_register_same_username_is_conflict() {
        let service = AuthService::new(InMemoryUserRepository::new(), issuer());
        service
            .register(register_input("alice", "a@example.com"))
            .await
            .unwrap();

        let err = service
            .register(register_input("alice", "b@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::AlreadyExists("username")));
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let service = AuthService::new(InMemoryUserRepository::new(), issuer());
        let user = service
            .register(register_input("carol", "carol@example.com"))
            .await
            .unwrap();

        assert_eq!(user.role, Role::User);
        assert_ne!(user.password_hash, "pa55word");
        assert!(verify_password("pa55word", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_insert_race_surfaces_as_already_exists() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_find_by_email().returning(|_| Ok(None));
        mock_repo.expect_find_by_username().returning(|_| Ok(None));
        mock_repo
            .expect_create()
            .returning(|_| Err(UserError::AlreadyExists("email")));

        let service = AuthService::new(mock_repo, issuer());
        let err = service
            .register(register_input("dave", "dave@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::AlreadyExists("email")));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_create().never();

        let service = AuthService::new(mock_repo, issuer());
        let err = service
            .register(register_input("erin", "not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Validation(_)));
    }

    #[tokio::test]
    async fn test_only_latest_login_is_current_session() {
        let service = AuthService::new(InMemoryUserRepository::new(), issuer());
        let user = service
            .register(register_input("frank", "frank@example.com"))
            .await
            .unwrap();

        let first = service.login(login_input("frank", "pa55word")).await.unwrap();
        let second = service.login(login_input("frank", "pa55word")).await.unwrap();

        assert!(!service
            .is_current_session(user.id, &first.access_token)
            .await
            .unwrap());
        assert!(service
            .is_current_session(user.id, &second.access_token)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let service = AuthService::new(InMemoryUserRepository::new(), issuer());
        let admin = AdminBootstrap {
            username: "admin".into(),
            email: "admin@example.com".into(),
            password: "change-me".into(),
            first_name: "Admin".into(),
            last_name: "Account".into(),
        };

        let created = service.ensure_admin(&admin).await.unwrap().unwrap();
        assert_eq!(created.role, Role::Admin);
        assert!(service.ensure_admin(&admin).await.unwrap().is_none());
    }
}
