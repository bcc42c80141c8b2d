// Comment handlers
// Painting and post comments share one implementation keyed by CommentTarget

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{info, warn};

use crate::{
    auth::CurrentUser,
    error::ApiError,
    extract::ValidJson,
    models::{Comment, CommentTarget, CreateCommentRequest},
    state::AppState,
};

fn resource_name(target: CommentTarget) -> &'static str {
    match target {
        CommentTarget::Painting => "painting",
        CommentTarget::Post => "post",
    }
}

async fn list(state: &AppState, target: CommentTarget, target_id: &str) -> Result<Vec<Comment>, ApiError> {
    let target_id = ApiError::parse_id(target_id, resource_name(target))?;

    let comments = state.db.get_comments(target, target_id).await?;

    info!("Retrieved {} comments for {} {}", comments.len(), resource_name(target), target_id);
    Ok(comments)
}

async fn create(
    state: &AppState,
    CurrentUser(user): CurrentUser,
    target: CommentTarget,
    target_id: &str,
    request: CreateCommentRequest,
) -> Result<Comment, ApiError> {
    info!("User {} commenting on {} {}", user.id, resource_name(target), target_id);
    let target_id = ApiError::parse_id(target_id, resource_name(target))?;

    state.db.create_comment(target, target_id, &user, request).await
}

async fn remove(
    state: &AppState,
    CurrentUser(user): CurrentUser,
    target: CommentTarget,
    comment_id: &str,
) -> Result<(), ApiError> {
    info!("User {} deleting {} comment {}", user.id, resource_name(target), comment_id);
    let comment_id = ApiError::parse_id(comment_id, "comment")?;

    let comment = state.db.get_comment_by_id(target, comment_id).await?;
    if !comment.can_be_deleted_by(user.id, user.is_admin(&state.admin_emails)) {
        warn!("User {} may not delete comment {}", user.id, comment_id);
        return Err(ApiError::forbidden("You can only delete your own comments"));
    }

    state.db.delete_comment(target, comment_id).await
}

/// GET /api/paintings/:id/comments
pub async fn get_painting_comments(
    State(state): State<AppState>,
    Path(painting_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = list(&state, CommentTarget::Painting, &painting_id).await?;
    Ok((StatusCode::OK, Json(comments)))
}

/// POST /api/paintings/:id/comments
pub async fn create_painting_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(painting_id): Path<String>,
    ValidJson(request): ValidJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = create(&state, user, CommentTarget::Painting, &painting_id, request).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/comments/:id
pub async fn delete_painting_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(comment_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    remove(&state, user, CommentTarget::Painting, &comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/posts/:id/comments
pub async fn get_post_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = list(&state, CommentTarget::Post, &post_id).await?;
    Ok((StatusCode::OK, Json(comments)))
}

/// POST /api/posts/:id/comments
pub async fn create_post_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<String>,
    ValidJson(request): ValidJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = create(&state, user, CommentTarget::Post, &post_id, request).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/post-comments/:id
pub async fn delete_post_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(comment_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    remove(&state, user, CommentTarget::Post, &comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
