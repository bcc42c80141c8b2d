// Event handlers
// Exhibition listings and admin management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    auth::AdminUser,
    error::ApiError,
    extract::{ValidJson, ValidQuery},
    models::{CreateEventRequest, EventWindow, UpdateEventRequest},
    state::AppState,
};

/// Query parameters for listing events
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    #[serde(default)]
    pub when: EventWindow,
}

/// GET /api/events?when=upcoming|past|all
pub async fn get_events(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<ListEventsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Fetching {:?} events", params.when);

    let events = state.db.get_events(params.when).await?;

    info!("Retrieved {} events", events.len());
    Ok((StatusCode::OK, Json(events)))
}

/// POST /api/admin/events
pub async fn create_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidJson(request): ValidJson<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Admin {} creating event: {}", admin.email, request.title);

    let event = state.db.create_event(request).await?;

    info!("Successfully created event with id: {}", event.id);
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/admin/events/:id
pub async fn update_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(event_id): Path<String>,
    ValidJson(request): ValidJson<UpdateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Admin {} updating event with id: {}", admin.email, event_id);
    let event_id = ApiError::parse_id(&event_id, "event")?;

    let event = state.db.update_event(event_id, request).await?;

    Ok((StatusCode::OK, Json(event)))
}

/// DELETE /api/admin/events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Admin {} deleting event with id: {}", admin.email, event_id);
    let event_id = ApiError::parse_id(&event_id, "event")?;

    state.db.delete_event(event_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
