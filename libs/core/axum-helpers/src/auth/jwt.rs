use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::access::{Identity, Role};
use super::config::JwtConfig;

/// Session lifetime when `JWT_TTL_SECONDS` is not set
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Claims signed into every session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    /// Makes two tokens issued in the same second distinct
    pub jti: Uuid,
}

impl SessionClaims {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.sub,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// A freshly signed token and the claims inside it
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

/// Signs and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl_seconds: config.ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    pub fn issue(
        &self,
        user_id: Uuid,
        username: &str,
        role: Role,
    ) -> Result<IssuedToken, TokenError> {
        let iat = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: user_id,
            username: username.to_string(),
            role,
            iat,
            exp: iat + self.ttl_seconds,
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Check signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(ttl_seconds: i64) -> TokenIssuer {
        let config = JwtConfig::new("test-secret-key-with-at-least-32-characters")
            .unwrap()
            .with_ttl_seconds(ttl_seconds);
        TokenIssuer::new(&config)
    }

    #[test]
    fn test_issue_then_verify_preserves_claims() {
        let issuer = issuer(3600);
        let user_id = Uuid::now_v7();

        let issued = issuer.issue(user_id, "alice", Role::Admin).unwrap();
        let claims = issuer.verify(&issued.token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims, issued.claims);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = issuer(-10);
        let issued = issuer.issue(Uuid::now_v7(), "bob", Role::User).unwrap();

        assert_eq!(issuer.verify(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_invalid() {
        let other = TokenIssuer::new(
            &JwtConfig::new("another-secret-key-with-at-least-32-characters").unwrap(),
        );
        let issued = other.issue(Uuid::now_v7(), "bob", Role::User).unwrap();

        assert!(matches!(
            issuer(3600).verify(&issued.token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert!(matches!(
            issuer(3600).verify("not.a.jwt"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_tokens_issued_back_to_back_differ() {
        let issuer = issuer(3600);
        let user_id = Uuid::now_v7();
        let first = issuer.issue(user_id, "carol", Role::User).unwrap();
        let second = issuer.issue(user_id, "carol", Role::User).unwrap();
        assert_ne!(first.token, second.token);
    }
}
