// Post handlers
// Published posts for visitors, drafts and editing for admins

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    auth::AdminUser,
    catalog::{paginate, PageRequest},
    error::ApiError,
    extract::{ValidJson, ValidQuery},
    models::{CreatePostRequest, Post, UpdatePostRequest},
    state::AppState,
};

/// Published posts, newest first
/// GET /api/posts?page&per_page
pub async fn get_published_posts(
    State(state): State<AppState>,
    ValidQuery(page_request): ValidQuery<PageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Fetching published posts");

    let posts = state.db.get_all_posts(true).await?;
    let page = paginate(posts, page_request);

    info!("Retrieved {} of {} published posts", page.items.len(), page.total);
    Ok((StatusCode::OK, Json(page)))
}

/// Look a post up by UUID or, failing that, by slug.
async fn find_post(state: &AppState, id_or_slug: &str) -> Result<Post, ApiError> {
    match Uuid::parse_str(id_or_slug) {
        Ok(post_id) => state.db.get_post_by_id(post_id).await,
        Err(_) => state.db.get_post_by_slug(&id_or_slug.to_lowercase()).await,
    }
}

/// Drafts are reported as missing
/// GET /api/posts/:id_or_slug
pub async fn get_published_post(
    State(state): State<AppState>,
    Path(id_or_slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Fetching post: {}", id_or_slug);

    let post = find_post(&state, &id_or_slug).await?;
    if !post.published {
        debug!("Post {} is a draft, hiding it from the public", post.id);
        return Err(ApiError::not_found(format!("Post '{}'", id_or_slug)));
    }

    Ok((StatusCode::OK, Json(post)))
}

/// Every post including drafts
/// GET /api/admin/posts
pub async fn get_all_posts(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("Admin {} fetching all posts", admin.email);

    let posts = state.db.get_all_posts(false).await?;

    info!("Retrieved {} posts", posts.len());
    Ok((StatusCode::OK, Json(posts)))
}

/// POST /api/admin/posts
pub async fn create_post(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidJson(request): ValidJson<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Admin {} creating post with title: {}", admin.email, request.title);

    let post = state.db.create_post(request).await?;

    info!("Successfully created post with id: {}", post.id);
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/admin/posts/:id
pub async fn update_post(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(post_id): Path<String>,
    ValidJson(request): ValidJson<UpdatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Admin {} updating post with id: {}", admin.email, post_id);
    let post_id = ApiError::parse_id(&post_id, "post")?;

    let post = state.db.update_post(post_id, request).await?;

    Ok((StatusCode::OK, Json(post)))
}

/// DELETE /api/admin/posts/:id
pub async fn delete_post(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Admin {} deleting post with id: {}", admin.email, post_id);
    let post_id = ApiError::parse_id(&post_id, "post")?;

    state.db.delete_post(post_id).await?;

    info!("Successfully deleted post with id: {} (comments cascade deleted)", post_id);
    Ok(StatusCode::NO_CONTENT)
}
