// User handlers
// The signed-in visitor's own profile and the admin user list

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use crate::{
    auth::{AdminUser, CurrentUser},
    error::ApiError,
    models::CurrentUserResponse,
    state::AppState,
};

/// The verified visitor and whether they may use the admin API
/// GET /api/me
pub async fn get_current_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("Fetching profile for user {}", user.id);

    let is_admin = user.is_admin(&state.admin_emails);

    Ok((StatusCode::OK, Json(CurrentUserResponse { user, is_admin })))
}

/// GET /api/admin/users
pub async fn get_all_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("Admin {} fetching all users", admin.email);

    let users = state.db.get_all_users().await?;

    info!("Retrieved {} users", users.len());
    Ok((StatusCode::OK, Json(users)))
}
