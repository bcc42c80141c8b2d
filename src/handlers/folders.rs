// Folder handlers
// Public browsing plus admin management of painting folders

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::{
    auth::AdminUser,
    error::ApiError,
    extract::ValidJson,
    models::{CreateFolderRequest, FolderWithPaintings, UpdateFolderRequest},
    state::AppState,
};

/// List folders in display order
/// GET /api/folders
pub async fn get_all_folders(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    info!("Fetching all folders");

    let folders = state.db.get_all_folders().await?;

    info!("Retrieved {} folders", folders.len());
    Ok((StatusCode::OK, Json(folders)))
}

/// Get a folder together with its paintings
/// GET /api/folders/:id
pub async fn get_folder_by_id(
    State(state): State<AppState>,
    Path(folder_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Fetching folder with id: {}", folder_id);
    let folder_id = ApiError::parse_id(&folder_id, "folder")?;

    let folder = state.db.get_folder_by_id(folder_id).await?;
    let paintings = state.db.get_all_paintings(Some(folder_id)).await?;

    Ok((StatusCode::OK, Json(FolderWithPaintings { folder, paintings })))
}

/// POST /api/admin/folders
pub async fn create_folder(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidJson(request): ValidJson<CreateFolderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Admin {} creating folder: {}", admin.email, request.name);

    let folder = state.db.create_folder(request).await?;

    info!("Successfully created folder with id: {}", folder.id);
    Ok((StatusCode::CREATED, Json(folder)))
}

/// PUT /api/admin/folders/:id
pub async fn update_folder(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(folder_id): Path<String>,
    ValidJson(request): ValidJson<UpdateFolderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Admin {} updating folder with id: {}", admin.email, folder_id);
    let folder_id = ApiError::parse_id(&folder_id, "folder")?;

    let folder = state.db.update_folder(folder_id, request).await?;

    Ok((StatusCode::OK, Json(folder)))
}

/// Paintings in the folder are kept and become unfiled.
/// DELETE /api/admin/folders/:id
pub async fn delete_folder(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(folder_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Admin {} deleting folder with id: {}", admin.email, folder_id);
    let folder_id = ApiError::parse_id(&folder_id, "folder")?;

    state.db.delete_folder(folder_id).await?;

    info!("Successfully deleted folder with id: {}", folder_id);
    Ok(StatusCode::NO_CONTENT)
}
