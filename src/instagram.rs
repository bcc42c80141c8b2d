//! Cross-posting paintings to Instagram through the Graph API.
//!
//! Publishing is a multi-step conversation: every image becomes a media
//! container, Instagram needs a moment to fetch the images, then the
//! container (or a carousel of containers) is published. Stories follow the
//! same shape with a single image.

use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::InstagramConfig;
use crate::error::ApiError;

pub const MAX_CAROUSEL_ITEMS: usize = 10;
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum InstagramError {
    #[error("Instagram request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Instagram API error: {0}")]
    Api(String),

    #[error("{0}")]
    InvalidMedia(String),
}

impl From<InstagramError> for ApiError {
    fn from(err: InstagramError) -> Self {
        match err {
            InstagramError::Transport(e) => {
                warn!("Instagram transport error: {}", e);
                ApiError::Upstream("Could not reach Instagram".to_string())
            }
            InstagramError::Api(message) => {
                warn!("Instagram API error: {}", message);
                ApiError::Upstream(format!("Instagram: {}", message))
            }
            InstagramError::InvalidMedia(message) => ApiError::Validation(message),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphErrorEnvelope {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PublishOutcome {
    pub media_id: String,
    pub story_media_id: Option<String>,
    /// Set when a story was requested but could not be published.
    pub story_error: Option<String>,
    pub container_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RefreshedToken {
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Reject image lists Instagram cannot publish as a post.
pub fn validate_images(image_urls: &[String]) -> Result<(), InstagramError> {
    if image_urls.is_empty() {
        return Err(InstagramError::InvalidMedia(
            "Painting has no images to publish".to_string(),
        ));
    }
    if image_urls.len() > MAX_CAROUSEL_ITEMS {
        return Err(InstagramError::InvalidMedia(format!(
            "Instagram carousels accept at most {} images",
            MAX_CAROUSEL_ITEMS
        )));
    }
    Ok(())
}

async fn read_graph_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, InstagramError> {
    let status = response.status();
    let body = response.text().await?;

    if let Ok(envelope) = serde_json::from_str::<GraphErrorEnvelope>(&body) {
        return Err(InstagramError::Api(envelope.error.message));
    }
    if !status.is_success() {
        return Err(InstagramError::Api(format!("HTTP {}", status.as_u16())));
    }

    serde_json::from_str(&body).map_err(|e| InstagramError::Api(format!("Unexpected response: {}", e)))
}

pub struct InstagramClient {
    http: reqwest::Client,
    account_id: String,
    graph_url: String,
    refresh_url: String,
    container_delay: Duration,
}

impl InstagramClient {
    pub fn new(config: &InstagramConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for Instagram")?;

        Ok(InstagramClient {
            http,
            account_id: config.account_id.clone(),
            graph_url: config.graph_url.trim_end_matches('/').to_string(),
            refresh_url: config.refresh_url.clone(),
            container_delay: config.container_delay,
        })
    }

    fn account_endpoint(&self, edge: &str) -> String {
        format!("{}/{}/{}", self.graph_url, self.account_id, edge)
    }

    async fn create_container(&self, params: &[(&str, &str)], token: &str) -> Result<String, InstagramError> {
        let mut form: Vec<(&str, &str)> = params.to_vec();
        form.push(("access_token", token));

        let response = self
            .http
            .post(self.account_endpoint("media"))
            .form(&form)
            .send()
            .await?;

        let created: GraphId = read_graph_response(response).await?;
        Ok(created.id)
    }

    /// A single-image container. Carousel children carry no caption.
    pub async fn create_image_container(
        &self,
        image_url: &str,
        caption: Option<&str>,
        carousel_item: bool,
        token: &str,
    ) -> Result<String, InstagramError> {
        let mut params = vec![("image_url", image_url)];
        if carousel_item {
            params.push(("is_carousel_item", "true"));
        } else if let Some(caption) = caption {
            params.push(("caption", caption));
        }

        let id = self.create_container(&params, token).await?;
        debug!("Created Instagram image container {} for {}", id, image_url);
        Ok(id)
    }

    pub async fn create_carousel_container(
        &self,
        children: &[String],
        caption: Option<&str>,
        token: &str,
    ) -> Result<String, InstagramError> {
        let children = children.join(",");
        let mut params = vec![("media_type", "CAROUSEL"), ("children", children.as_str())];
        if let Some(caption) = caption {
            params.push(("caption", caption));
        }

        let id = self.create_container(&params, token).await?;
        debug!("Created Instagram carousel container {}", id);
        Ok(id)
    }

    pub async fn create_story_container(&self, image_url: &str, token: &str) -> Result<String, InstagramError> {
        let id = self
            .create_container(&[("media_type", "STORIES"), ("image_url", image_url)], token)
            .await?;
        debug!("Created Instagram story container {}", id);
        Ok(id)
    }

    pub async fn publish(&self, creation_id: &str, token: &str) -> Result<String, InstagramError> {
        let response = self
            .http
            .post(self.account_endpoint("media_publish"))
            .form(&[("creation_id", creation_id), ("access_token", token)])
            .send()
            .await?;

        let published: GraphId = read_graph_response(response).await?;
        info!("Published Instagram container {} as media {}", creation_id, published.id);
        Ok(published.id)
    }

    async fn wait_for_containers(&self) {
        if !self.container_delay.is_zero() {
            debug!("Waiting {:?} for Instagram to process containers", self.container_delay);
            tokio::time::sleep(self.container_delay).await;
        }
    }

    /// Publish `image_urls` as a post (a carousel when there are several)
    /// and optionally the first image as a story.
    pub async fn publish_painting(
        &self,
        image_urls: &[String],
        caption: Option<&str>,
        story: bool,
        token: &str,
    ) -> Result<PublishOutcome, InstagramError> {
        validate_images(image_urls)?;

        let carousel = image_urls.len() > 1;
        let mut container_ids = Vec::with_capacity(image_urls.len());
        for image_url in image_urls {
            let id = self
                .create_image_container(image_url, caption, carousel, token)
                .await?;
            container_ids.push(id);
        }
        self.wait_for_containers().await;

        let creation_id = if carousel {
            let id = self
                .create_carousel_container(&container_ids, caption, token)
                .await?;
            self.wait_for_containers().await;
            id
        } else {
            container_ids[0].clone()
        };

        let media_id = self.publish(&creation_id, token).await?;

        // The post is live from here on; story failures are reported, not returned.
        let (story_media_id, story_error) = if story {
            match self.publish_story(&image_urls[0], token).await {
                Ok(id) => (Some(id), None),
                Err(e) => {
                    warn!("Instagram story for media {} failed: {}", media_id, e);
                    (None, Some(e.to_string()))
                }
            }
        } else {
            (None, None)
        };

        info!(
            "Instagram publish complete: media {} from {} image(s), story: {:?}",
            media_id,
            image_urls.len(),
            story_media_id
        );

        Ok(PublishOutcome {
            media_id,
            story_media_id,
            story_error,
            container_ids,
        })
    }

    async fn publish_story(&self, image_url: &str, token: &str) -> Result<String, InstagramError> {
        let story_container = self.create_story_container(image_url, token).await?;
        self.wait_for_containers().await;
        self.publish(&story_container, token).await
    }

    /// Exchange a long-lived token for a fresh one.
    pub async fn refresh_token(&self, token: &str) -> Result<RefreshedToken, InstagramError> {
        let response = self
            .http
            .get(&self.refresh_url)
            .query(&[("grant_type", "ig_refresh_token"), ("access_token", token)])
            .send()
            .await?;

        let refreshed: RefreshResponse = read_graph_response(response).await?;
        let expires_at = refreshed
            .expires_in
            .map(|seconds| Utc::now() + chrono::Duration::seconds(seconds));

        info!("Refreshed Instagram access token (expires at {:?})", expires_at);
        Ok(RefreshedToken {
            access_token: refreshed.access_token,
            expires_at,
        })
    }
}
