// HTTP handlers for the portfolio API

pub mod comments;
pub mod events;
pub mod folders;
pub mod instagram;
pub mod paintings;
pub mod posts;
pub mod users;

use axum::{http::StatusCode, response::IntoResponse};

/// Health check handler
/// Returns "OK" with 200 status for monitoring purposes
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
