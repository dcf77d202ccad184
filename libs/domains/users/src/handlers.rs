use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use axum_helpers::{
    Access, AuditEvent, AuditOutcome, Gate, Identity, ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    guard,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{LoginRequest, LoginResponse, RegisterUser, UserResponse};
use crate::repository::UserRepository;
use crate::service::AuthService;

/// OpenAPI documentation for the auth API
#[derive(OpenApi)]
#[openapi(
    paths(login, register, register_admin),
    components(
        schemas(LoginRequest, LoginResponse, RegisterUser, UserResponse),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Auth", description = "Login and registration")
    )
)]
pub struct ApiDoc;

/// Auth routes: `/login` and `/register` are public, `/register-admin` needs an admin.
pub fn router<R: UserRepository + 'static>(service: Arc<AuthService<R>>, gate: &Gate) -> Router {
    let public = guard(
        Router::new()
            .route("/login", post(login))
            .route("/register", post(register)),
        gate,
        Access::PUBLIC,
    );

    let admin = guard(
        Router::new().route("/register-admin", post(register_admin)),
        gate,
        Access::ADMIN,
    );

    public.merge(admin).with_state(service)
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(service): State<Arc<AuthService<R>>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<LoginResponse>> {
    let username = input.username.clone();

    match service.login(input).await {
        Ok(response) => {
            AuditEvent::new(None, "auth.login", AuditOutcome::Success)
                .with_resource(format!("user:{}", username))
                .with_request_headers(&headers)
                .log();
            Ok(Json(response))
        }
        Err(err) => {
            if matches!(err, UserError::NotFound(_) | UserError::InvalidCredentials) {
                AuditEvent::new(None, "auth.login", AuditOutcome::Failure)
                    .with_resource(format!("user:{}", username))
                    .with_request_headers(&headers)
                    .log();
            }
            Err(err)
        }
    }
}

/// Register a regular user account
#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(service): State<Arc<AuthService<R>>>,
    ValidatedJson(input): ValidatedJson<RegisterUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.register(input).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Register an admin account
#[utoipa::path(
    post,
    path = "/register-admin",
    tag = "Auth",
    request_body = RegisterUser,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Admin registered", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register_admin<R: UserRepository>(
    State(service): State<Arc<AuthService<R>>>,
    identity: Identity,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<RegisterUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.register_admin(input).await?;

    AuditEvent::new(Some(identity.user_id), "auth.register_admin", AuditOutcome::Success)
        .with_resource(format!("user:{}", user.id))
        .with_request_headers(&headers)
        .log();

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
