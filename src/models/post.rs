use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use super::{double_option, normalize_optional, slugify, validate_slug, validate_title, validate_url};

const MAX_CONTENT_LENGTH: usize = 100_000;

/// Blog / news entry. Drafts (`published == false`) are only visible to admins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub cover_image_url: Option<Option<String>>,
    pub published: Option<bool>,
}

impl Post {
    pub fn new(
        title: String,
        slug: String,
        content: String,
        cover_image_url: Option<String>,
        published: bool,
    ) -> Self {
        let now = Utc::now();

        Post {
            id: Uuid::new_v4(),
            title,
            slug,
            content,
            cover_image_url,
            published,
            published_at: published.then_some(now),
            created_at: now,
            updated_at: now,
        }
    }
}

fn validate_content(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Content cannot be empty".to_string());
    }

    if content.len() > MAX_CONTENT_LENGTH {
        return Err(format!("Content cannot exceed {} characters", MAX_CONTENT_LENGTH));
    }

    Ok(())
}

impl CreatePostRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_title("Title", &self.title)?;

        match self.slug {
            Some(ref slug) => validate_slug(slug.trim())?,
            None if slugify(&self.title).is_empty() => {
                return Err("A slug is required when the title has no letters or digits".to_string());
            }
            None => {}
        }

        validate_content(&self.content)?;

        if let Some(ref url) = self.cover_image_url {
            if !url.trim().is_empty() {
                validate_url("Cover image URL", url)?;
            }
        }

        Ok(())
    }

    pub fn into_post(self) -> Post {
        let title = self.title.trim().to_string();
        let slug = self
            .slug
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| slugify(&title));

        Post::new(
            title,
            slug,
            self.content.trim().to_string(),
            normalize_optional(self.cover_image_url.as_ref()),
            self.published,
        )
    }
}

impl UpdatePostRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.is_none()
            && self.slug.is_none()
            && self.content.is_none()
            && self.cover_image_url.is_none()
            && self.published.is_none()
        {
            return Err("At least one field must be provided for update".to_string());
        }

        if let Some(ref title) = self.title {
            validate_title("Title", title)?;
        }

        if let Some(ref slug) = self.slug {
            validate_slug(slug.trim())?;
        }

        if let Some(ref content) = self.content {
            validate_content(content)?;
        }

        if let Some(Some(ref url)) = self.cover_image_url {
            if !url.trim().is_empty() {
                validate_url("Cover image URL", url)?;
            }
        }

        Ok(())
    }

    pub fn get_normalized_title(&self) -> Option<String> {
        self.title.as_ref().map(|t| t.trim().to_string())
    }

    pub fn get_normalized_slug(&self) -> Option<String> {
        self.slug.as_ref().map(|s| s.trim().to_string())
    }

    pub fn get_normalized_content(&self) -> Option<String> {
        self.content.as_ref().map(|c| c.trim().to_string())
    }

    pub fn get_normalized_cover_image_url(&self) -> Option<Option<String>> {
        self.cover_image_url
            .as_ref()
            .map(|url| normalize_optional(url.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, published: bool) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            slug: None,
            content: "Opening night was a success.".to_string(),
            cover_image_url: None,
            published,
        }
    }

    #[test]
    fn test_post_creation_sets_published_at() {
        let draft = request("Studio notes", false).into_post();
        assert!(!draft.published);
        assert_eq!(draft.published_at, None);

        let published = request("Studio notes", true).into_post();
        assert_eq!(published.published_at, Some(published.created_at));
    }

    #[test]
    fn test_create_post_request_validation() {
        assert!(request("Studio notes", false).validate().is_ok());
        assert!(request("", false).validate().is_err());
        assert!(request("***", false).validate().is_err());

        let mut with_slug = request("***", false);
        with_slug.slug = Some("stars".to_string());
        assert!(with_slug.validate().is_ok());

        let mut empty_content = request("Studio notes", false);
        empty_content.content = "  ".to_string();
        assert!(empty_content.validate().is_err());

        let mut bad_cover = request("Studio notes", false);
        bad_cover.cover_image_url = Some("not a url".to_string());
        assert!(bad_cover.validate().is_err());

        let mut blank_cover = request("Studio notes", false);
        blank_cover.cover_image_url = Some("  ".to_string());
        assert!(blank_cover.validate().is_ok());
        assert_eq!(blank_cover.into_post().cover_image_url, None);
    }

    #[test]
    fn test_into_post_derives_slug() {
        let post = request("  New Series: Tides ", true).into_post();
        assert_eq!(post.title, "New Series: Tides");
        assert_eq!(post.slug, "new-series-tides");
    }

    #[test]
    fn test_update_post_request() {
        assert!(UpdatePostRequest::default().validate().is_err());

        let publish: UpdatePostRequest =
            serde_json::from_str(r#"{"published": true}"#).expect("valid json");
        assert!(publish.validate().is_ok());

        let clear_cover: UpdatePostRequest =
            serde_json::from_str(r#"{"cover_image_url": null}"#).expect("valid json");
        assert!(clear_cover.validate().is_ok());
        assert_eq!(clear_cover.get_normalized_cover_image_url(), Some(None));

        let bad_slug: UpdatePostRequest =
            serde_json::from_str(r#"{"slug": "Bad Slug"}"#).expect("valid json");
        assert!(bad_slug.validate().is_err());
    }

    #[test]
    fn test_post_serialization() {
        let post = request("Studio notes", false).into_post();
        let json = serde_json::to_value(&post).expect("serializable");
        assert_eq!(json["slug"], "studio-notes");
        assert_eq!(json["published"], false);
        assert!(json["published_at"].is_null());
    }
}
