//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use artist_portfolio_api::{
    config::{Config, DatabaseConfig, Environment, GoogleConfig, InstagramConfig},
    create_router,
    db::Database,
    state::AppState,
};
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "artist@example.com";
pub const GOOGLE_CLIENT_ID: &str = "portfolio-test.apps.googleusercontent.com";

/// Points at a port nothing listens on; pool connections are only attempted
/// when a handler reaches the database.
pub fn unreachable_database() -> DatabaseConfig {
    DatabaseConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        database: "portfolio_test".to_string(),
        username: "portfolio".to_string(),
        password: "portfolio".to_string(),
        ssl_mode: "disable".to_string(),
        max_connections: 1,
        connection_timeout: Duration::from_secs(1),
    }
}

pub fn test_config(tokeninfo_url: &str, instagram: Option<InstagramConfig>) -> Config {
    Config {
        port: 8080,
        request_timeout: Duration::from_secs(10),
        database: unreachable_database(),
        google: GoogleConfig {
            client_id: GOOGLE_CLIENT_ID.to_string(),
            tokeninfo_url: tokeninfo_url.to_string(),
        },
        admin_emails: vec![ADMIN_EMAIL.to_string()],
        instagram,
        environment: Environment::Local,
    }
}

pub fn build_state(config: &Config) -> AppState {
    let db = Database::connect_lazy(config.database.clone()).expect("lazy pool");
    AppState::new(db, config).expect("app state")
}

pub fn build_test_app(tokeninfo_url: &str) -> Router {
    let config = test_config(tokeninfo_url, None);
    create_router(build_state(&config), config.request_timeout)
}

/// Serve `router` on an ephemeral local port.
pub async fn spawn_stub(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server");
    });
    addr
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).expect("request");
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
