//! Per-operation access control.
//!
//! Every route group is wrapped with [`guard`] and an [`Access`] rule. The
//! middleware resolves the bearer token, consults the optional
//! [`SessionRegistry`], applies the role rule and stores the caller's
//! [`Identity`] in the request extensions for handlers to extract.

use async_trait::async_trait;
use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::access::{Access, Identity, Role};
use super::jwt::{SessionClaims, TokenError, TokenIssuer};
use crate::errors::AppError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No token, bad signature, expired or superseded
    #[error("Unauthenticated: {0}")]
    Unauthenticated(&'static str),

    #[error("Role '{0}' is not allowed to perform this operation")]
    Unauthorized(Role),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated(_) => {
                AppError::Unauthorized("Authentication required".to_string())
            }
            AuthError::Unauthorized(_) => AppError::Forbidden(err.to_string()),
        }
    }
}

/// Answers whether a token is still the latest one issued to its user.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    async fn is_current(&self, user_id: Uuid, token: &str) -> eyre::Result<bool>;
}

/// Token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verify a bearer token.
pub fn authenticate(
    issuer: &TokenIssuer,
    token: Option<&str>,
) -> Result<SessionClaims, AuthError> {
    let token = token.ok_or(AuthError::Unauthenticated("missing bearer token"))?;

    issuer.verify(token).map_err(|e| match e {
        TokenError::Expired => AuthError::Unauthenticated("token expired"),
        _ => AuthError::Unauthenticated("invalid token"),
    })
}

/// Apply the role rule of `access` to verified claims.
pub fn authorize(access: &Access, claims: &SessionClaims) -> Result<Identity, AuthError> {
    if !access.admits(claims.role) {
        return Err(AuthError::Unauthorized(claims.role));
    }
    Ok(claims.identity())
}

/// Shared gate configuration, cloned into every guarded router.
#[derive(Clone)]
pub struct Gate {
    issuer: Arc<TokenIssuer>,
    sessions: Option<Arc<dyn SessionRegistry>>,
}

impl Gate {
    pub fn new(issuer: Arc<TokenIssuer>) -> Self {
        Self {
            issuer,
            sessions: None,
        }
    }

    /// Only accept the most recently issued token per user.
    pub fn with_sessions(mut self, sessions: Arc<dyn SessionRegistry>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Full decision for one request: `Ok(None)` for public operations.
    pub async fn check(
        &self,
        access: &Access,
        headers: &HeaderMap,
    ) -> Result<Option<Identity>, AppError> {
        if access.public {
            return Ok(None);
        }

        let claims = authenticate(&self.issuer, bearer_token(headers)).inspect_err(|e| {
            tracing::debug!(reason = %e, "Rejected request at gate");
        })?;

        if let Some(sessions) = &self.sessions {
            let token = bearer_token(headers).unwrap_or_default();
            let current = sessions
                .is_current(claims.sub, token)
                .await
                .map_err(|e| AppError::InternalServerError(format!("Session lookup failed: {}", e)))?;
            if !current {
                tracing::debug!(user_id = %claims.sub, "Rejected superseded session token");
                return Err(AuthError::Unauthenticated("session superseded").into());
            }
        }

        let identity = authorize(access, &claims).inspect_err(|e| {
            tracing::debug!(user_id = %claims.sub, reason = %e, "Rejected request at gate");
        })?;

        Ok(Some(identity))
    }
}

#[derive(Clone)]
struct Guard {
    gate: Gate,
    access: Access,
}

async fn require(
    State(guard): State<Guard>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(identity) = guard.gate.check(&guard.access, request.headers()).await? {
        request.extensions_mut().insert(identity);
    }
    Ok(next.run(request).await)
}

/// Put every route currently in `router` behind `access`.
///
/// ```ignore
/// let admin = guard(
///     Router::new().route("/orders", get(find_all_orders)),
///     &gate,
///     Access::ADMIN,
/// );
/// ```
pub fn guard<S>(router: Router<S>, gate: &Gate, access: Access) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(
        Guard {
            gate: gate.clone(),
            access,
        },
        require,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use axum::http::HeaderValue;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&JwtConfig::new("gate-test-secret-with-at-least-32-chars").unwrap())
    }

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    struct FixedSessions(bool);

    #[async_trait]
    impl SessionRegistry for FixedSessions {
        async fn is_current(&self, _user_id: Uuid, _token: &str) -> eyre::Result<bool> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers_with("abc")), Some("abc"));
        assert_eq!(bearer_token(&HeaderMap::new()), None);

        let mut basic = HeaderMap::new();
        basic.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&basic), None);
    }

    #[test]
    fn test_missing_token_is_unauthenticated() {
        assert_eq!(
            authenticate(&issuer(), None),
            Err(AuthError::Unauthenticated("missing bearer token"))
        );
    }

    #[test]
    fn test_user_token_on_admin_operation_is_unauthorized() {
        let issuer = issuer();
        let issued = issuer.issue(Uuid::now_v7(), "dave", Role::User).unwrap();
        let claims = authenticate(&issuer, Some(&issued.token)).unwrap();

        assert_eq!(
            authorize(&Access::ADMIN, &claims),
            Err(AuthError::Unauthorized(Role::User))
        );
    }

    #[test]
    fn test_admin_token_on_admin_operation_yields_identity() {
        let issuer = issuer();
        let user_id = Uuid::now_v7();
        let issued = issuer.issue(user_id, "root", Role::Admin).unwrap();
        let claims = authenticate(&issuer, Some(&issued.token)).unwrap();

        let identity = authorize(&Access::ADMIN, &claims).unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_public_access_skips_token_check() {
        let gate = Gate::new(Arc::new(issuer()));
        let result = gate.check(&Access::PUBLIC, &headers_with("garbage")).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_superseded_session_is_rejected() {
        let issuer = Arc::new(issuer());
        let issued = issuer.issue(Uuid::now_v7(), "erin", Role::User).unwrap();
        let headers = headers_with(&issued.token);

        let stale = Gate::new(issuer.clone()).with_sessions(Arc::new(FixedSessions(false)));
        assert!(matches!(
            stale.check(&Access::AUTHENTICATED, &headers).await,
            Err(AppError::Unauthorized(_))
        ));

        let current = Gate::new(issuer).with_sessions(Arc::new(FixedSessions(true)));
        assert!(current.check(&Access::AUTHENTICATED, &headers).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_guarded_route_statuses() {
        use axum::{
            body::Body,
            http::{Request, StatusCode},
            routing::get,
        };
        use tower::ServiceExt;

        let issuer = Arc::new(issuer());
        let gate = Gate::new(issuer.clone());
        let app: Router = guard(
            Router::new().route("/admin", get(|identity: Identity| async move { identity.username })),
            &gate,
            Access::ADMIN,
        );

        let request = |token: Option<&str>| {
            let mut builder = Request::get("/admin");
            if let Some(token) = token {
                builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
            }
            builder.body(Body::empty()).unwrap()
        };

        let response = app.clone().oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let user = issuer.issue(Uuid::now_v7(), "user", Role::User).unwrap();
        let response = app.clone().oneshot(request(Some(&user.token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let admin = issuer.issue(Uuid::now_v7(), "admin", Role::Admin).unwrap();
        let response = app.oneshot(request(Some(&admin.token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_auth_error_status_mapping() {
        let unauthenticated: AppError = AuthError::Unauthenticated("invalid token").into();
        assert!(matches!(unauthenticated, AppError::Unauthorized(_)));

        let unauthorized: AppError = AuthError::Unauthorized(Role::User).into();
        assert!(matches!(unauthorized, AppError::Forbidden(_)));
    }
}
