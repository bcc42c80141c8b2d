//! `Json` and `Query` wrappers whose rejections render as `ApiError`, so a
//! malformed body or query string gets the same JSON error envelope as every
//! other failure.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ValidJson(value))
    }
}

pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ValidQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, StatusCode},
        routing::{get, post},
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct Comment {
        content: String,
    }

    #[derive(Debug, Deserialize)]
    struct Paging {
        page: Option<u32>,
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/comments",
                post(|ValidJson(comment): ValidJson<Comment>| async move { comment.content }),
            )
            .route(
                "/items",
                get(|ValidQuery(paging): ValidQuery<Paging>| async move { format!("{:?}", paging.page) }),
            )
    }

    async fn error_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
        serde_json::from_slice(&bytes).expect("json error body")
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_envelope() {
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/comments")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"content\": "))
            .expect("request");

        let response = app().oneshot(request).await.expect("infallible");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = error_body(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_missing_content_type_uses_error_envelope() {
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/comments")
            .body(Body::from("{\"content\": \"hi\"}"))
            .expect("request");

        let response = app().oneshot(request).await.expect("infallible");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_bad_query_value_uses_error_envelope() {
        let request = axum::http::Request::builder()
            .uri("/items?page=first")
            .body(Body::empty())
            .expect("request");

        let response = app().oneshot(request).await.expect("infallible");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_valid_input_passes_through() {
        let request = axum::http::Request::builder()
            .uri("/items?page=3")
            .body(Body::empty())
            .expect("request");

        let response = app().oneshot(request).await.expect("infallible");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
        assert_eq!(&bytes[..], b"Some(3)");
    }
}
