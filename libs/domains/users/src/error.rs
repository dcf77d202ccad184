use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User '{0}' not found")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// `field` is `"email"` or `"username"`
    #[error("User already exists with same {0}")]
    AlreadyExists(&'static str),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        UserError::Internal(format!("Database error: {}", err))
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => AppError::NotFound(err.to_string()),
            UserError::InvalidCredentials => AppError::Unauthorized(err.to_string()),
            UserError::AlreadyExists(_) => AppError::Conflict(err.to_string()),
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::PasswordHash(_) | UserError::Token(_) | UserError::Internal(_) => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_already_exists_message_names_field() {
        assert_eq!(
            UserError::AlreadyExists("email").to_string(),
            "User already exists with same email"
        );
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (UserError::NotFound("ghost".into()), StatusCode::NOT_FOUND),
            (UserError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (UserError::AlreadyExists("username"), StatusCode::CONFLICT),
            (UserError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }
}
