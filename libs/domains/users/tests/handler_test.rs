//! Handler tests for the users domain
//!
//! Drive the auth router with in-memory storage: request validation,
//! status codes, error bodies and the per-route access rules.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::Router;
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use test_utils::{TestAuth, TestDataBuilder};
use tower::ServiceExt; // For oneshot()
use uuid::Uuid;

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn app(auth: &TestAuth) -> (Router, Arc<AuthService<InMemoryUserRepository>>) {
    let service = Arc::new(AuthService::new(
        InMemoryUserRepository::new(),
        auth.issuer.clone(),
    ));
    (handlers::router(service.clone(), &auth.gate), service)
}

fn post_json(uri: &str, body: Value, bearer: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, bearer);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn register_payload(builder: &TestDataBuilder, suffix: &str) -> Value {
    json!({
        "username": builder.name("user", suffix),
        "password": "pa55word",
        "email": builder.email(suffix),
        "first_name": "Test",
        "last_name": "User"
    })
}

#[tokio::test]
async fn test_register_returns_201_without_secrets() {
    let auth = TestAuth::new();
    let (app, _) = app(&auth);
    let builder = TestDataBuilder::from_test_name("register_201");

    let response = app
        .oneshot(post_json("/register", register_payload(&builder, "a"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["role"], "user");
    assert!(body.get("password_hash").is_none());
    assert!(body.get("current_session_token").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_returns_409() {
    let auth = TestAuth::new();
    let (app, _) = app(&auth);
    let builder = TestDataBuilder::from_test_name("register_409");

    let first = register_payload(&builder, "a");
    let mut second = register_payload(&builder, "b");
    second["email"] = first["email"].clone();

    let response = app
        .clone()
        .oneshot(post_json("/register", first, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(post_json("/register", second, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "User already exists with same email");
}

#[tokio::test]
async fn test_register_invalid_email_returns_400() {
    let auth = TestAuth::new();
    let (app, _) = app(&auth);
    let builder = TestDataBuilder::from_test_name("register_400");

    let mut payload = register_payload(&builder, "a");
    payload["email"] = json!("not-an-email");

    let response = app
        .oneshot(post_json("/register", payload, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_returns_bearer_token() {
    let auth = TestAuth::new();
    let (app, service) = app(&auth);
    let builder = TestDataBuilder::from_test_name("login_200");

    let payload: RegisterUser = serde_json::from_value(register_payload(&builder, "a")).unwrap();
    let user = service.register(payload.clone()).await.unwrap();

    let response = app
        .oneshot(post_json(
            "/login",
            json!({"username": payload.username, "password": "pa55word"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: LoginResponse = json_body(response.into_body()).await;
    assert_eq!(body.token_type, "Bearer");
    let claims = auth.issuer.verify(&body.access_token).unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.role, Role::User);
}

#[tokio::test]
async fn test_login_failures() {
    let auth = TestAuth::new();
    let (app, service) = app(&auth);
    let builder = TestDataBuilder::from_test_name("login_failures");

    let payload: RegisterUser = serde_json::from_value(register_payload(&builder, "a")).unwrap();
    service.register(payload.clone()).await.unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/login",
            json!({"username": payload.username, "password": "wrong"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/login",
            json!({"username": "nobody", "password": "x"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(post_json(
            "/login",
            json!({"username": "", "password": "x"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_admin_access_rules() {
    let auth = TestAuth::new();
    let (app, _) = app(&auth);
    let builder = TestDataBuilder::from_test_name("register_admin");

    let response = app
        .clone()
        .oneshot(post_json("/register-admin", register_payload(&builder, "a"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/register-admin",
            register_payload(&builder, "a"),
            Some(auth.bearer(Uuid::now_v7(), Role::User)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(post_json(
            "/register-admin",
            register_payload(&builder, "a"),
            Some(auth.bearer(Uuid::now_v7(), Role::Admin)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: UserResponse = json_body(response.into_body()).await;
    assert_eq!(body.role, Role::Admin);
}
