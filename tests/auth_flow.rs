use axum::{
    body::Body,
    extract::FromRef,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use prolancer::{
    app::build_app,
    auth::jwt::JwtKeys,
    state::AppState,
    users::repo_types::AccountType,
};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn signup_body(email: &str, password: &str) -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": email,
        "passwordHash": password,
    })
}

async fn signup(app: &Router, role: &str, email: &str) -> String {
    let (status, body) = call(app, Method::POST, &format!("/signup/{role}"), None, Some(signup_body(email, "Abcdef1!"))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_probe() {
    let app = build_app(AppState::fake());
    let res = app
        .oneshot(Request::builder().uri("/test").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"connection was ok");
}

#[tokio::test]
async fn signup_then_duplicate_email() {
    let app = build_app(AppState::fake());

    let (status, body) = call(&app, Method::POST, "/signup/client", None, Some(signup_body("a@b.com", "Abcdef1!"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert!(!body["token"].as_str().unwrap().is_empty());

    let (status, body) = call(&app, Method::POST, "/signup/client", None, Some(signup_body("a@b.com", "Abcdef1!"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["type"], "duplicate");
    assert_eq!(body["field"], "email");
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn signup_rejects_unknown_role() {
    let app = build_app(AppState::fake());
    let (status, body) = call(&app, Method::POST, "/signup/admin", None, Some(signup_body("a@b.com", "Abcdef1!"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "validation");
    assert!(body["errors"]["accountType"].is_string());
}

#[tokio::test]
async fn signup_aggregates_validation_errors() {
    let app = build_app(AppState::fake());
    let (status, body) = call(
        &app,
        Method::POST,
        "/signup/freelancer",
        None,
        Some(json!({ "firstName": "", "email": "not-an-email", "passwordHash": "weak" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "validation");
    let errors = body["errors"].as_object().unwrap();
    assert!(errors.contains_key("firstName"));
    assert!(errors.contains_key("email"));
    assert!(errors.contains_key("password"));
}

#[tokio::test]
async fn signup_accepts_password_alias() {
    let app = build_app(AppState::fake());
    let (status, _) = call(
        &app,
        Method::POST,
        "/signup/client",
        None,
        Some(json!({ "firstName": "Ada", "email": "a@b.com", "password": "Abcdef1!" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn login_wrong_password_then_right() {
    let state = AppState::fake();
    let keys = JwtKeys::from_ref(&state);
    let app = build_app(state);
    signup(&app, "freelancer", "a@b.com").await;

    let (status, body) = call(&app, Method::POST, "/api/users/login", None, Some(json!({ "email": "a@b.com", "password": "Wrong123!" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert!(body.get("token").is_none());
    let wrong_password_message = body["message"].clone();

    let (status, body) = call(&app, Method::POST, "/api/users/login", None, Some(json!({ "email": "nobody@b.com", "password": "Abcdef1!" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], wrong_password_message);

    let (status, body) = call(&app, Method::POST, "/api/users/login", None, Some(json!({ "email": "a@b.com", "password": "Abcdef1!" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let claims = keys.verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.session.role, AccountType::Freelancer);
    assert_eq!(claims.session.email, "a@b.com");
}

#[tokio::test]
async fn profile_requires_bearer() {
    let app = build_app(AppState::fake());

    let (status, body) = call(&app, Method::GET, "/api/users/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["type"], "auth");

    let (status, body) = call(&app, Method::GET, "/api/users/profile", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn expired_token_is_reported_as_expired() {
    let state = AppState::fake();
    let keys = JwtKeys::from_ref(&state);
    let app = build_app(state);
    let token = signup(&app, "client", "a@b.com").await;
    let session = keys.verify(&token).unwrap().session;

    let stale = keys.issue_with_ttl(&session, time::Duration::hours(-1)).unwrap();
    let (status, body) = call(&app, Method::GET, "/api/users/profile", Some(&stale), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token expired");
}

#[tokio::test]
async fn profile_fetch_shape() {
    let app = build_app(AppState::fake());
    let token = signup(&app, "client", "a@b.com").await;

    let (status, body) = call(&app, Method::GET, "/api/users/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["email"], "a@b.com");
    assert_eq!(data["firstName"], "Ada");
    assert_eq!(data["lastName"], "Lovelace");
    assert_eq!(data["accountType"], "client");
    assert_eq!(data["country"], "india");
    assert!(data["phoneNumber"].is_null());
    assert!(data.get("passwordHash").is_none());
}

#[tokio::test]
async fn profile_update_ignores_email_and_account_type() {
    let app = build_app(AppState::fake());
    let token = signup(&app, "client", "a@b.com").await;

    let (status, body) = call(
        &app,
        Method::PUT,
        "/api/users/profile",
        Some(&token),
        Some(json!({ "email": "new@x.com", "accountType": "freelancer", "firstName": "X", "phoneNumber": "+91 99" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "a@b.com");
    assert_eq!(body["data"]["accountType"], "client");
    assert_eq!(body["data"]["firstName"], "X");
    assert_eq!(body["data"]["phoneNumber"], "+91 99");

    let (_, body) = call(&app, Method::GET, "/api/users/profile", Some(&token), None).await;
    assert_eq!(body["data"]["email"], "a@b.com");
    assert_eq!(body["data"]["firstName"], "X");
}

#[tokio::test]
async fn profile_patch_rejects_blank_first_name() {
    let app = build_app(AppState::fake());
    let token = signup(&app, "freelancer", "a@b.com").await;

    let (status, body) = call(&app, Method::PATCH, "/api/users/profile", Some(&token), Some(json!({ "firstName": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "validation");
}

#[tokio::test]
async fn earlier_token_stays_valid_after_new_login() {
    // Tokens are stateless: a second login does not invalidate the first.
    let app = build_app(AppState::fake());
    let first = signup(&app, "client", "a@b.com").await;
    let (_, body) = call(&app, Method::POST, "/api/users/login", None, Some(json!({ "email": "a@b.com", "password": "Abcdef1!" }))).await;
    assert!(body["token"].is_string());

    let (status, _) = call(&app, Method::GET, "/api/users/profile", Some(&first), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_bodies_use_failure_envelope() {
    let app = build_app(AppState::fake());

    let (status, body) = call(&app, Method::POST, "/signup/client", None, Some(json!({ "email": 5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["type"], "validation");
    assert!(body["errors"]["body"].is_string());

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/users/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["type"], "validation");

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/users/login")
        .body(Body::from(r#"{"email":"a@b.com","password":"Abcdef1!"}"#))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["type"], "validation");
    assert!(body["message"].as_str().unwrap().contains("Content-Type"));
}

#[tokio::test]
async fn profile_update_with_wrong_types_is_validation_error() {
    let app = build_app(AppState::fake());
    let token = signup(&app, "client", "a@b.com").await;

    let (status, body) = call(&app, Method::PUT, "/api/users/profile", Some(&token), Some(json!({ "firstName": 7 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "validation");
}
