// Instagram handlers
// Admin-triggered cross-posting and token maintenance

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    auth::AdminUser,
    error::ApiError,
    extract::ValidJson,
    instagram::{InstagramClient, PublishOutcome},
    models::Painting,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub painting_id: Uuid,
    pub caption: Option<String>,
    #[serde(default)]
    pub story: bool,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub painting: Painting,
    #[serde(flatten)]
    pub outcome: PublishOutcome,
    pub media_id_saved: bool,
    pub token_refreshed: bool,
}

#[derive(Debug, Serialize)]
pub struct TokenStatus {
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Caption used when the admin does not write one: title, then the
/// description and a "medium, year" line when known.
pub fn default_caption(painting: &Painting) -> String {
    let mut lines = vec![painting.title.clone()];

    if let Some(ref description) = painting.description {
        lines.push(description.clone());
    }

    let details: Vec<String> = painting
        .medium
        .iter()
        .cloned()
        .chain(painting.year.map(|y| y.to_string()))
        .collect();
    if !details.is_empty() {
        lines.push(details.join(", "));
    }

    lines.join("\n\n")
}

/// Refresh and persist the token, returning the new expiry.
async fn refresh_and_store(
    state: &AppState,
    client: &InstagramClient,
    token: &str,
) -> Result<Option<DateTime<Utc>>, ApiError> {
    let refreshed = client.refresh_token(token).await?;
    state
        .db
        .save_instagram_token(&refreshed.access_token, refreshed.expires_at)
        .await?;
    Ok(refreshed.expires_at)
}

/// Publish, then record the media id and refresh the token. Once the post
/// is live, failures of the follow-up steps are logged and reported in the
/// response instead of being returned as errors.
async fn publish_and_record(
    state: AppState,
    client: Arc<InstagramClient>,
    painting: Painting,
    caption: String,
    story: bool,
    token: String,
) -> Result<PublishResponse, ApiError> {
    let outcome = client
        .publish_painting(&painting.image_urls, Some(&caption), story, &token)
        .await?;

    let (painting, media_id_saved) = match state
        .db
        .set_painting_instagram_media(painting.id, &outcome.media_id)
        .await
    {
        Ok(updated) => (updated, true),
        Err(e) => {
            error!(
                "Painting {} is live on Instagram as {} but the media id was not stored: {}",
                painting.id, outcome.media_id, e
            );
            (painting, false)
        }
    };

    let token_refreshed = match refresh_and_store(&state, &client, &token).await {
        Ok(_) => true,
        Err(e) => {
            warn!("Instagram token refresh after publish failed: {}", e);
            false
        }
    };

    info!("Painting {} published to Instagram as {}", painting.id, outcome.media_id);
    Ok(PublishResponse {
        painting,
        outcome,
        media_id_saved,
        token_refreshed,
    })
}

/// Publish a painting's images as a post (and optionally a story)
/// POST /api/admin/instagram/publish
pub async fn publish_painting(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidJson(request): ValidJson<PublishRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        "Admin {} publishing painting {} to Instagram (story: {})",
        admin.email, request.painting_id, request.story
    );
    let client = state.instagram()?;

    let painting = state.db.get_painting_by_id(request.painting_id).await?;
    let token = state.db.get_instagram_token().await?;

    let caption = request
        .caption
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_caption(&painting));

    // Detached so a request timeout cannot cancel a publish halfway through.
    let task = tokio::spawn(publish_and_record(
        state.clone(),
        client,
        painting,
        caption,
        request.story,
        token.access_token,
    ));
    let response = task
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Instagram publish task failed: {}", e)))??;

    Ok((StatusCode::OK, Json(response)))
}

/// POST /api/admin/instagram/refresh
pub async fn refresh_token(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("Admin {} refreshing the Instagram token", admin.email);
    let client = state.instagram()?;

    let token = state.db.get_instagram_token().await?;
    refresh_and_store(&state, &client, &token.access_token).await?;

    let stored = state.db.get_instagram_token().await?;
    Ok((
        StatusCode::OK,
        Json(TokenStatus {
            expires_at: stored.expires_at,
            updated_at: stored.updated_at,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painting() -> Painting {
        Painting {
            id: Uuid::new_v4(),
            folder_id: None,
            title: "Harbour at Dusk".to_string(),
            description: None,
            medium: None,
            width_cm: None,
            height_cm: None,
            year: None,
            price: None,
            sold: false,
            featured: false,
            image_urls: vec!["https://cdn.example.com/harbour.jpg".to_string()],
            instagram_media_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_default_caption_title_only() {
        assert_eq!(default_caption(&painting()), "Harbour at Dusk");
    }

    #[test]
    fn test_default_caption_with_details() {
        let mut painting = painting();
        painting.description = Some("Evening light over the boats.".to_string());
        painting.medium = Some("Oil on canvas".to_string());
        painting.year = Some(2023);

        assert_eq!(
            default_caption(&painting),
            "Harbour at Dusk\n\nEvening light over the boats.\n\nOil on canvas, 2023"
        );
    }

    #[test]
    fn test_publish_request_defaults() {
        let request: PublishRequest =
            serde_json::from_str(r#"{"painting_id":"67e55044-10b1-426f-9247-bb680e5fe0c8"}"#).expect("valid json");
        assert!(!request.story);
        assert!(request.caption.is_none());
    }
}
