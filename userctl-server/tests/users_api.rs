//! End-to-end tests for the /users routes against in-memory SQLite

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use userctl_server::db::{create_pool, ensure_schema};
use userctl_server::{
    build_router, DbError, NotFoundPolicy, ServerConfig, SqliteUserStore, UserFields,
    UserRecord, UserStore,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("userctl_server=debug")
        .with_test_writer()
        .try_init();
}

async fn app_with(policy: NotFoundPolicy) -> Router {
    init_tracing();
    let pool = create_pool("sqlite::memory:").await.unwrap();
    ensure_schema(&pool).await.unwrap();
    let config = ServerConfig {
        not_found: policy,
        ..ServerConfig::default()
    };
    build_router(Arc::new(SqliteUserStore::new(pool)), &config)
}

async fn app() -> Router {
    app_with(NotFoundPolicy::Strict).await
}

fn ada() -> Value {
    json!({
        "name": "Ada",
        "surname": "Lovelace",
        "birthday": "1815-12-10",
        "email": "ada@example.com",
        "address": "10 Downing St"
    })
}

fn grace() -> Value {
    json!({
        "name": "Grace",
        "surname": "Hopper",
        "birthday": "1906-12-09",
        "email": "grace@navy.example.org",
        "address": "Arlington, Virginia"
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn with_id(mut payload: Value, id: i64) -> Value {
    payload["id"] = json!(id);
    payload
}

#[tokio::test]
async fn ada_lovelace_lifecycle() {
    let app = app().await;

    let (status, created) = send(&app, "POST", "/users/", Some(&ada())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created, with_id(ada(), 1));

    let (status, fetched) = send(&app, "GET", "/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, deleted) = send(&app, "DELETE", "/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"message": "User deleted"}));

    let (status, body) = send(&app, "GET", "/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn list_returns_every_created_user() {
    let app = app().await;

    let (status, empty) = send(&app, "GET", "/users/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty, json!([]));

    let mut created = Vec::new();
    for payload in [ada(), grace(), ada()] {
        let (status, body) = send(&app, "POST", "/users/", Some(&payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        created.push(body);
    }

    let (_, listed) = send(&app, "GET", "/users/", None).await;
    assert_eq!(listed, Value::Array(created));

    let (status, _) = send(&app, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_fields_are_rejected_without_writing() {
    let app = app().await;

    let cases = [
        ("name", json!("A")),
        ("surname", json!("L")),
        ("birthday", json!("10/12/1815")),
        ("email", json!("not-an-email")),
        ("email", json!("a..b@example.com")),
        ("email", json!(format!("{}@example.com", "a".repeat(120)))),
        ("address", json!("Home")),
    ];

    for (field, value) in cases {
        let mut payload = ada();
        payload[field] = value;

        let (status, body) = send(&app, "POST", "/users/", Some(&payload)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "field {field}");
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["details"][0]["field"], field);
    }

    let (_, listed) = send(&app, "GET", "/users/", None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn validation_reports_all_fields() {
    let app = app().await;
    let payload = json!({
        "name": "A",
        "surname": "B",
        "birthday": "1815-12-10",
        "email": "ada@example.com",
        "address": "x"
    });

    let (status, body) = send(&app, "POST", "/users/", Some(&payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "surname", "address"]);
}

#[tokio::test]
async fn malformed_payloads_are_rejected() {
    let app = app().await;

    let mut missing = ada();
    missing.as_object_mut().unwrap().remove("email");
    let (status, body) = send(&app, "POST", "/users/", Some(&missing)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_payload");

    let client_id = with_id(ada(), 99);
    let (status, body) = send(&app, "POST", "/users/", Some(&client_id)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_payload");

    let request = Request::builder()
        .method("POST")
        .uri("/users/")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (_, listed) = send(&app, "GET", "/users/", None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn non_integer_id_is_rejected() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/users/abc", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "user_id");

    let (status, _) = send(&app, "DELETE", "/users/1.5", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn put_replaces_all_fields_but_id() {
    let app = app().await;
    send(&app, "POST", "/users/", Some(&ada())).await;

    let (status, body) = send(&app, "PUT", "/users/1", Some(&grace())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, with_id(grace(), 1));

    let (_, fetched) = send(&app, "GET", "/users/1", None).await;
    assert_eq!(fetched, with_id(grace(), 1));
}

#[tokio::test]
async fn put_is_idempotent() {
    let app = app().await;
    send(&app, "POST", "/users/", Some(&ada())).await;

    let (_, first) = send(&app, "PUT", "/users/1", Some(&grace())).await;
    let (_, after_first) = send(&app, "GET", "/users/", None).await;
    let (_, second) = send(&app, "PUT", "/users/1", Some(&grace())).await;
    let (_, after_second) = send(&app, "GET", "/users/", None).await;

    assert_eq!(first, second);
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn put_with_invalid_payload_leaves_row_untouched() {
    let app = app().await;
    send(&app, "POST", "/users/", Some(&ada())).await;

    let mut bad = grace();
    bad["birthday"] = json!("someday");
    let (status, _) = send(&app, "PUT", "/users/1", Some(&bad)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, fetched) = send(&app, "GET", "/users/1", None).await;
    assert_eq!(fetched, with_id(ada(), 1));
}

#[tokio::test]
async fn strict_put_on_missing_id_is_404() {
    let app = app().await;

    let (status, body) = send(&app, "PUT", "/users/5", Some(&ada())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "user '5' not found");
}

#[tokio::test]
async fn delete_is_a_noop_for_missing_ids() {
    let app = app().await;
    send(&app, "POST", "/users/", Some(&ada())).await;

    for _ in 0..2 {
        let (status, body) = send(&app, "DELETE", "/users/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "User deleted"}));
    }

    let (_, listed) = send(&app, "GET", "/users/", None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn compat_mode_reproduces_absent_row_behavior() {
    let app = app_with(NotFoundPolicy::Compat).await;

    let (status, body) = send(&app, "GET", "/users/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, "PUT", "/users/3", Some(&ada())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, with_id(ada(), 3));

    let (_, listed) = send(&app, "GET", "/users/", None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn health_reports_store_status() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

/// Store double whose every call fails
struct BrokenStore;

fn broken() -> DbError {
    DbError::Sqlx(sqlx::Error::PoolClosed)
}

#[async_trait]
impl UserStore for BrokenStore {
    async fn insert(&self, _: &UserFields) -> Result<i64, DbError> {
        Err(broken())
    }

    async fn select_all(&self) -> Result<Vec<UserRecord>, DbError> {
        Err(broken())
    }

    async fn select_one(&self, _: i64) -> Result<Option<UserRecord>, DbError> {
        Err(broken())
    }

    async fn update(&self, _: i64, _: &UserFields) -> Result<u64, DbError> {
        Err(broken())
    }

    async fn delete(&self, _: i64) -> Result<u64, DbError> {
        Err(broken())
    }

    async fn ping(&self) -> Result<(), DbError> {
        Err(broken())
    }
}

#[tokio::test]
async fn persistence_failures_are_opaque_500s() {
    init_tracing();
    let app = build_router(Arc::new(BrokenStore), &ServerConfig::default());

    let calls = [
        ("POST", "/users/", Some(ada())),
        ("GET", "/users/", None),
        ("GET", "/users/1", None),
        ("PUT", "/users/1", Some(ada())),
        ("DELETE", "/users/1", None),
    ];

    for (method, uri, body) in calls {
        let (status, body) = send(&app, method, uri, body.as_ref()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "an internal error occurred");
    }

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], "unavailable");
}

#[tokio::test]
async fn validation_runs_before_the_store() {
    let app = build_router(Arc::new(BrokenStore), &ServerConfig::default());

    let mut bad = ada();
    bad["name"] = json!("A");
    let (status, _) = send(&app, "POST", "/users/", Some(&bad)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

/// Store double that never answers in time
struct StalledStore;

async fn stall<T>() -> Result<T, DbError> {
    tokio::time::sleep(Duration::from_secs(60)).await;
    Err(broken())
}

#[async_trait]
impl UserStore for StalledStore {
    async fn insert(&self, _: &UserFields) -> Result<i64, DbError> {
        stall().await
    }

    async fn select_all(&self) -> Result<Vec<UserRecord>, DbError> {
        stall().await
    }

    async fn select_one(&self, _: i64) -> Result<Option<UserRecord>, DbError> {
        stall().await
    }

    async fn update(&self, _: i64, _: &UserFields) -> Result<u64, DbError> {
        stall().await
    }

    async fn delete(&self, _: i64) -> Result<u64, DbError> {
        stall().await
    }

    async fn ping(&self) -> Result<(), DbError> {
        stall().await
    }
}

#[tokio::test]
async fn slow_requests_time_out_with_408() {
    let config = ServerConfig {
        request_timeout: Duration::from_millis(20),
        ..ServerConfig::default()
    };
    let app = build_router(Arc::new(StalledStore), &config);

    let (status, _) = send(&app, "GET", "/users/", None).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}
