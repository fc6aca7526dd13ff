use axum::Json;
use axum::extract::Query;
use axum::http::{HeaderMap as AxumHeaders, StatusCode as AxumStatus};
use axum::routing::{get, post};
use serde_json::json;

use super::*;
use crate::error::{ErrorKind, FieldError};
use crate::session::MemoryCookieStore;
use crate::test_support::{client_for, signed_in_cookies, spawn_backend};

async fn echo_headers(headers: AxumHeaders) -> Json<Value> {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    Json(json!({ "authorization": read("authorization"), "adminUser": read("x-admin-user-id") }))
}

fn backend() -> axum::Router {
    axum::Router::new()
        .route("/echo", get(echo_headers))
        .route(
            "/enveloped",
            get(|| async {
                Json(json!({
                    "success": true,
                    "message": "ok",
                    "data": { "id": 7, "name": "Pasta Place" },
                    "timestamp": "2026-01-01T00:00:00Z",
                    "statusCode": 200
                }))
            }),
        )
        .route("/raw", get(|| async { Json(json!([1, 2, 3])) }))
        .route(
            "/rejected",
            get(|| async {
                Json(json!({ "success": false, "message": "Offer expired", "errorCode": "OFFER_EXPIRED", "statusCode": 409 }))
            }),
        )
        .route(
            "/bad-request",
            post(|| async {
                (
                    AxumStatus::BAD_REQUEST,
                    Json(json!({ "message": "Validation failed", "errors": { "email": "must not be blank" } })),
                )
            }),
        )
        .route(
            "/forbidden",
            get(|| async {
                (
                    AxumStatus::FORBIDDEN,
                    Json(json!({ "success": false, "message": "Access denied", "errorCode": "ACCESS_DENIED" })),
                )
            }),
        )
        .route("/gateway", get(|| async { (AxumStatus::BAD_GATEWAY, "<html>upstream down</html>") }))
        .route("/empty", axum::routing::delete(|| async { AxumStatus::NO_CONTENT }))
        .route(
            "/search",
            get(|Query(params): Query<std::collections::HashMap<String, String>>| async move { Json(json!(params)) }),
        )
}

#[tokio::test]
async fn attaches_bearer_and_admin_headers() {
    let base = spawn_backend(backend()).await;
    let client = client_for(&base, signed_in_cookies());

    let echoed: Value = client.send_data(ApiRequest::get("/echo")).await.unwrap();
    assert_eq!(echoed["authorization"], "Bearer token-abc");
    assert_eq!(echoed["adminUser"], "42");
}

#[tokio::test]
async fn omits_auth_headers_without_session() {
    let base = spawn_backend(backend()).await;
    let client = client_for(&base, Arc::new(MemoryCookieStore::new()));

    let echoed: Value = client.send_data(ApiRequest::get("echo")).await.unwrap();
    assert!(echoed["authorization"].is_null());
    assert!(echoed["adminUser"].is_null());
}

#[tokio::test]
async fn unwraps_envelope_data() {
    let base = spawn_backend(backend()).await;
    let client = client_for(&base, signed_in_cookies());

    let data: Value = client.send_data(ApiRequest::get("/enveloped")).await.unwrap();
    assert_eq!(data, json!({ "id": 7, "name": "Pasta Place" }));
}

#[tokio::test]
async fn passes_plain_bodies_through() {
    let base = spawn_backend(backend()).await;
    let client = client_for(&base, signed_in_cookies());

    let data: Vec<u32> = client.send_data(ApiRequest::get("/raw")).await.unwrap();
    assert_eq!(data, vec![1, 2, 3]);
}

#[tokio::test]
async fn unsuccessful_envelope_is_an_error_even_with_ok_status() {
    let base = spawn_backend(backend()).await;
    let client = client_for(&base, signed_in_cookies());

    let err = client.send_raw(ApiRequest::get("/rejected")).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.code(), Some("OFFER_EXPIRED"));
    assert_eq!(err.to_string(), "Offer expired");
}

#[tokio::test]
async fn validation_errors_are_collected() {
    let base = spawn_backend(backend()).await;
    let client = client_for(&base, signed_in_cookies());

    let request = ApiRequest::post("/bad-request")
        .json(&json!({ "email": "" }))
        .unwrap();
    let err = client.send_raw(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        err,
        ApiError::Backend {
            status: 400,
            message: "Validation failed".into(),
            code: None,
            field_errors: vec![FieldError { field: "email".into(), message: "must not be blank".into() }],
        }
    );
    assert_eq!(err.user_message(), "email: must not be blank");
}

#[tokio::test]
async fn forbidden_uses_structured_code() {
    let base = spawn_backend(backend()).await;
    let client = client_for(&base, signed_in_cookies());

    let err = client.send_raw(ApiRequest::get("/forbidden")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert_eq!(err.to_string(), "Access denied");
}

#[tokio::test]
async fn unparseable_error_body_gets_status_message() {
    let base = spawn_backend(backend()).await;
    let client = client_for(&base, signed_in_cookies());

    let err = client.send_raw(ApiRequest::get("/gateway")).await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed with status 502");
    assert_eq!(err.kind(), ErrorKind::Backend);
}

#[tokio::test]
async fn empty_body_is_null() {
    let base = spawn_backend(backend()).await;
    let client = client_for(&base, signed_in_cookies());

    let body = client.send_raw(ApiRequest::delete("/empty")).await.unwrap();
    assert!(body.is_null());
}

#[tokio::test]
async fn query_pairs_are_sent() {
    let base = spawn_backend(backend()).await;
    let client = client_for(&base, signed_in_cookies());

    let request = ApiRequest::get("/search")
        .query_pair("page", "2")
        .query_pairs([("search".to_owned(), "pizza".to_owned())]);
    let echoed: Value = client.send_data(request).await.unwrap();
    assert_eq!(echoed, json!({ "page": "2", "search": "pizza" }));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{addr}"), signed_in_cookies());
    let err = client.send_raw(ApiRequest::get("/echo")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[test]
fn request_paths_gain_leading_slash() {
    let request = ApiRequest::patch("api/admin/users/1");
    assert_eq!(request.path(), "/api/admin/users/1");
    assert_eq!(*request.method(), Method::PATCH);
}
