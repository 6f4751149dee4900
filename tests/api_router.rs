//! Request-level checks. Each request needs at most the user lookup done by
//! the auth extractor, which a mock connection answers.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::Value;
use tower::ServiceExt;
use unitedpackers_api::{
    config::AppConfig,
    entity::users::{Model as UserModel, Role},
    payment::SimulatedGateway,
    routes::{create_api_router, quotes::parse_if_match},
    services::auth_service::issue_token,
    state::AppState,
};
use uuid::Uuid;

const SECRET: &str = "router-test-secret";

fn app(orm: DatabaseConnection) -> Router {
    let state = AppState {
        orm,
        config: Arc::new(test_config()),
        payments: Arc::new(SimulatedGateway),
    };
    Router::new().nest("/api", create_api_router()).with_state(state)
}

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: SECRET.into(),
        jwt_ttl_hours: 1,
        cors_origin: None,
    }
}

fn user_row(id: Uuid, role: Role) -> UserModel {
    UserModel {
        id,
        name: "Router Test".into(),
        email: format!("{id}@router.test"),
        phone: None,
        password_hash: "unused".into(),
        role,
        created_at: Utc::now().into(),
    }
}

/// A token plus the stored user row it resolves to.
fn signed_in(role: Role) -> (String, UserModel) {
    let id = Uuid::new_v4();
    let token = issue_token(id, role, SECRET, 1).expect("token");
    (token, user_row(id, role))
}

/// Answers the auth extractor's user lookup with `rows`.
fn users_lookup(rows: Vec<UserModel>) -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([rows])
        .into_connection()
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    send_on(DatabaseConnection::Disconnected, request).await
}

async fn send_as(user: UserModel, request: Request<Body>) -> (StatusCode, Value) {
    send_on(users_lookup(vec![user]), request).await
}

async fn send_on(orm: DatabaseConnection, request: Request<Body>) -> (StatusCode, Value) {
    let response = app(orm).oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn json_request(method: Method, uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

#[tokio::test]
async fn owner_routes_require_a_token() {
    let request = Request::get("/api/users/quotes").body(Body::empty()).unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["data"]["kind"], "auth_expired");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let expired = issue_token(Uuid::new_v4(), Role::Admin, SECRET, -2).expect("token");
    let request = Request::get("/api/admin/dashboard")
        .header(header::AUTHORIZATION, format!("Bearer {expired}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["data"]["error"], "Unauthorized: Token has expired");
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let foreign = issue_token(Uuid::new_v4(), Role::Admin, "someone-else", 1).expect("token");
    let request = Request::get("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {foreign}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_forbid_regular_users() {
    for uri in ["/api/admin/dashboard", "/api/admin/quotes", "/api/admin/enquiries"] {
        let (user, row) = signed_in(Role::User);
        let request = Request::get(uri)
            .header(header::AUTHORIZATION, format!("Bearer {user}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send_as(row, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["data"]["kind"], "forbidden");
    }
}

#[tokio::test]
async fn quote_update_is_admin_only() {
    let (user, row) = signed_in(Role::User);
    let uri = format!("/api/quotes/{}", Uuid::new_v4());
    let request = json_request(
        Method::PUT,
        &uri,
        Some(&user),
        serde_json::json!({ "status": "reviewing" }),
    );
    let (status, _) = send_as(row, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn negative_cost_is_a_validation_error() {
    let (admin, row) = signed_in(Role::Admin);
    let uri = format!("/api/quotes/{}", Uuid::new_v4());
    let request = json_request(
        Method::PUT,
        &uri,
        Some(&admin),
        serde_json::json!({ "estimatedCost": -100 }),
    );
    let (status, body) = send_as(row, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["kind"], "validation_error");
}

#[tokio::test]
async fn malformed_if_match_is_rejected() {
    let (admin, row) = signed_in(Role::Admin);
    let request = Request::put(format!("/api/quotes/{}", Uuid::new_v4()))
        .header(header::AUTHORIZATION, format!("Bearer {admin}"))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::IF_MATCH, "yesterday")
        .body(Body::from(r#"{"status":"reviewing"}"#))
        .unwrap();
    let (status, _) = send_as(row, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn out_of_range_rating_is_rejected() {
    let (user, row) = signed_in(Role::User);
    let request = json_request(
        Method::POST,
        "/api/feedback",
        Some(&user),
        serde_json::json!({ "quoteId": Uuid::new_v4(), "rating": 9 }),
    );
    let (status, body) = send_as(row, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["data"]["error"].as_str().unwrap_or_default().contains("Rating"));
}

#[tokio::test]
async fn invalid_ifsc_is_rejected() {
    let (user, row) = signed_in(Role::User);
    let uri = format!("/api/quotes/{}/payment", Uuid::new_v4());
    let request = json_request(
        Method::POST,
        &uri,
        Some(&user),
        serde_json::json!({
            "method": "netbanking",
            "details": { "accountNumber": "123456789012", "ifsc": "BAD" }
        }),
    );
    let (status, _) = send_as(row, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stored_role_overrides_the_token_claim() {
    // Issued as admin, demoted since.
    let id = Uuid::new_v4();
    let stale = issue_token(id, Role::Admin, SECRET, 1).expect("token");
    let request = Request::get("/api/admin/dashboard")
        .header(header::AUTHORIZATION, format!("Bearer {stale}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_as(user_row(id, Role::User), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["data"]["kind"], "forbidden");
}

#[tokio::test]
async fn token_for_a_deleted_user_is_rejected() {
    let id = Uuid::new_v4();
    let orphan = issue_token(id, Role::User, SECRET, 1).expect("token");
    let request = Request::get("/api/users/quotes")
        .header(header::AUTHORIZATION, format!("Bearer {orphan}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_on(users_lookup(Vec::new()), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["data"]["kind"], "auth_expired");
}

#[tokio::test]
async fn invalid_enquiry_is_rejected_before_storage() {
    let request = json_request(
        Method::POST,
        "/api/enquiries",
        None,
        serde_json::json!({ "name": "A", "email": "not-an-email", "phone": "1", "message": "" }),
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["data"]["error"].as_str().unwrap_or_default();
    assert!(error.contains("email"), "{error}");
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let request = Request::get("/api/nope").body(Body::empty()).unwrap();
    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test]
fn if_match_accepts_quoted_and_weak_timestamps() {
    let mut headers = axum::http::HeaderMap::new();
    assert!(parse_if_match(&headers).unwrap().is_none());

    headers.insert(header::IF_MATCH, "W/\"2024-06-01T10:00:00+05:30\"".parse().unwrap());
    let parsed = parse_if_match(&headers).unwrap().expect("timestamp");
    assert_eq!(parsed.to_rfc3339(), "2024-06-01T10:00:00+05:30");

    headers.insert(header::IF_MATCH, "*".parse().unwrap());
    assert!(parse_if_match(&headers).unwrap().is_none());
}
