use std::time::Duration;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{
    handlers::{comments, events, folders, health_check, instagram, paintings, posts, users},
    middleware::create_middleware_stack,
    state::AppState,
};

/// Create the Axum router with all endpoints and middleware
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Public catalog
        .route("/api/folders", get(folders::get_all_folders))
        .route("/api/folders/:id", get(folders::get_folder_by_id))
        .route("/api/paintings", get(paintings::get_all_paintings))
        .route("/api/paintings/:id", get(paintings::get_painting_by_id))
        .route("/api/posts", get(posts::get_published_posts))
        .route("/api/posts/:id", get(posts::get_published_post))
        .route("/api/events", get(events::get_events))
        // Comments (reading is public, writing needs a Google sign-in)
        .route(
            "/api/paintings/:id/comments",
            get(comments::get_painting_comments).post(comments::create_painting_comment),
        )
        .route(
            "/api/posts/:id/comments",
            get(comments::get_post_comments).post(comments::create_post_comment),
        )
        .route("/api/comments/:id", delete(comments::delete_painting_comment))
        .route("/api/post-comments/:id", delete(comments::delete_post_comment))
        .route("/api/me", get(users::get_current_user))
        // Admin
        .route("/api/admin/folders", post(folders::create_folder))
        .route(
            "/api/admin/folders/:id",
            put(folders::update_folder).delete(folders::delete_folder),
        )
        .route("/api/admin/paintings", post(paintings::create_painting))
        .route(
            "/api/admin/paintings/:id",
            put(paintings::update_painting).delete(paintings::delete_painting),
        )
        .route(
            "/api/admin/posts",
            get(posts::get_all_posts).post(posts::create_post),
        )
        .route(
            "/api/admin/posts/:id",
            put(posts::update_post).delete(posts::delete_post),
        )
        .route("/api/admin/events", post(events::create_event))
        .route(
            "/api/admin/events/:id",
            put(events::update_event).delete(events::delete_event),
        )
        .route("/api/admin/users", get(users::get_all_users))
        .route("/api/admin/instagram/publish", post(instagram::publish_painting))
        .route("/api/admin/instagram/refresh", post(instagram::refresh_token))
        .with_state(state)
        .layer(create_middleware_stack(request_timeout))
}
