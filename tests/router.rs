//! Routing, authentication gates and request validation, all of which are
//! decided before any handler touches the database.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::{routing::get as get_route, Json, Router};
use common::{body_json, build_test_app, get, send, spawn_stub};
use serde_json::json;

const NO_GOOGLE: &str = "http://127.0.0.1:1/tokeninfo";

#[tokio::test]
async fn health_check_returns_ok() {
    let response = get(build_test_app(NO_GOOGLE), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = get(build_test_app(NO_GOOGLE), "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_painting_id_is_a_validation_error() {
    let response = get(build_test_app(NO_GOOGLE), "/api/paintings/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["message"], "Invalid painting ID format");
}

#[tokio::test]
async fn unknown_sort_order_is_rejected() {
    let response = get(build_test_app(NO_GOOGLE), "/api/paintings?sort=cheapest_first").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn unknown_event_window_is_rejected() {
    let response = get(build_test_app(NO_GOOGLE), "/api/events?when=someday").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn commenting_requires_a_bearer_token() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/paintings/67e55044-10b1-426f-9247-bb680e5fe0c8/comments")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"content": "Lovely colours"}).to_string()))
        .expect("request");

    let response = send(build_test_app(NO_GOOGLE), request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn deleting_a_post_comment_requires_a_bearer_token() {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/post-comments/67e55044-10b1-426f-9247-bb680e5fe0c8")
        .body(Body::empty())
        .expect("request");

    let response = send(build_test_app(NO_GOOGLE), request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_non_bearer_credentials() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/folders")
        .header(header::AUTHORIZATION, "Basic YWRtaW46YWRtaW4=")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"name": "Landscapes"}).to_string()))
        .expect("request");

    let response = send(build_test_app(NO_GOOGLE), request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_rejected_by_google_is_unauthorized() {
    let google = Router::new().route(
        "/tokeninfo",
        get_route(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "invalid_token", "error_description": "Invalid Value"})),
            )
        }),
    );
    let addr = spawn_stub(google).await;
    let app = build_test_app(&format!("http://{}/tokeninfo", addr));

    let request = Request::builder()
        .uri("/api/me")
        .header(header::AUTHORIZATION, "Bearer forged.id.token")
        .body(Body::empty())
        .expect("request");

    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unreachable_google_is_a_bad_gateway() {
    let request = Request::builder()
        .uri("/api/me")
        .header(header::AUTHORIZATION, "Bearer some.id.token")
        .body(Body::empty())
        .expect("request");

    let response = send(build_test_app(NO_GOOGLE), request).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn cors_preflight_allows_authorization_header() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/paintings/67e55044-10b1-426f-9247-bb680e5fe0c8/comments")
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "authorization,content-type")
        .body(Body::empty())
        .expect("request");

    let response = send(build_test_app(NO_GOOGLE), request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let allowed = response
        .headers()
        .get("access-control-allow-headers")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_lowercase();
    assert!(allowed.contains("authorization"));
    assert_eq!(
        response.headers().get("access-control-allow-origin").map(|v| v.as_bytes()),
        Some(&b"*"[..])
    );
}

#[tokio::test]
async fn instagram_is_unavailable_without_configuration() {
    let config = common::test_config(NO_GOOGLE, None);
    let state = common::build_state(&config);

    let err = state.instagram().err().expect("integration disabled");
    assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}
