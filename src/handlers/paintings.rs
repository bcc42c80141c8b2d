// Painting handlers
// The public gallery and admin management of the catalog

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::{
    auth::AdminUser,
    catalog::PaintingQuery,
    error::ApiError,
    extract::{ValidJson, ValidQuery},
    models::{CreatePaintingRequest, UpdatePaintingRequest},
    state::AppState,
};

/// Filtered, sorted and paginated gallery
/// GET /api/paintings?folder&search&year&availability&featured&sort&page&per_page
pub async fn get_all_paintings(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<PaintingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Fetching paintings with query: {:?}", query);

    let paintings = state.db.get_all_paintings(query.folder).await?;
    let page = query.apply(paintings);

    info!(
        "Retrieved page {} of {} ({} matching paintings)",
        page.page, page.total_pages, page.total
    );
    Ok((StatusCode::OK, Json(page)))
}

/// GET /api/paintings/:id
pub async fn get_painting_by_id(
    State(state): State<AppState>,
    Path(painting_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Fetching painting with id: {}", painting_id);
    let painting_id = ApiError::parse_id(&painting_id, "painting")?;

    let painting = state.db.get_painting_by_id(painting_id).await?;

    Ok((StatusCode::OK, Json(painting)))
}

/// POST /api/admin/paintings
pub async fn create_painting(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidJson(request): ValidJson<CreatePaintingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Admin {} creating painting: {}", admin.email, request.title);

    let painting = state.db.create_painting(request).await?;

    info!("Successfully created painting with id: {}", painting.id);
    Ok((StatusCode::CREATED, Json(painting)))
}

/// PUT /api/admin/paintings/:id
pub async fn update_painting(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(painting_id): Path<String>,
    ValidJson(request): ValidJson<UpdatePaintingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Admin {} updating painting with id: {}", admin.email, painting_id);
    let painting_id = ApiError::parse_id(&painting_id, "painting")?;

    let painting = state.db.update_painting(painting_id, request).await?;

    Ok((StatusCode::OK, Json(painting)))
}

/// DELETE /api/admin/paintings/:id
pub async fn delete_painting(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(painting_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Admin {} deleting painting with id: {}", admin.email, painting_id);
    let painting_id = ApiError::parse_id(&painting_id, "painting")?;

    state.db.delete_painting(painting_id).await?;

    info!("Successfully deleted painting with id: {} (comments cascade deleted)", painting_id);
    Ok(StatusCode::NO_CONTENT)
}
