// Models module
// Domain entities, request payloads and their validation rules

pub mod comment;
pub mod event;
pub mod folder;
pub mod painting;
pub mod post;
pub mod user;

use serde::{Deserialize, Deserializer};

// Re-export commonly used types
pub use comment::{Comment, CommentAuthor, CommentTarget, CreateCommentRequest};
pub use event::{CreateEventRequest, Event, EventWindow, UpdateEventRequest};
pub use folder::{CreateFolderRequest, Folder, FolderWithPaintings, UpdateFolderRequest};
pub use painting::{CreatePaintingRequest, Painting, UpdatePaintingRequest};
pub use post::{CreatePostRequest, Post, UpdatePostRequest};
pub use user::{CurrentUserResponse, GoogleProfile, User};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_SLUG_LENGTH: usize = 120;
pub const MAX_URL_LENGTH: usize = 2048;

/// Distinguishes "field absent" (`None`) from "field set to null" (`Some(None)`)
/// in partial update payloads. Use together with `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Required, trimmed, length-limited text such as titles and names.
pub(crate) fn validate_title(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} cannot be empty", field));
    }

    if value.trim().chars().count() > MAX_TITLE_LENGTH {
        return Err(format!("{} cannot exceed {} characters", field, MAX_TITLE_LENGTH));
    }

    Ok(())
}

pub(crate) fn validate_slug(slug: &str) -> Result<(), String> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err("Slug must contain only lowercase letters, digits and single hyphens".to_string())
    }
}

pub(crate) fn validate_url(field: &str, url: &str) -> Result<(), String> {
    let url = url.trim();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(format!("{} must be an http(s) URL", field));
    }

    if url.len() > MAX_URL_LENGTH {
        return Err(format!("{} cannot exceed {} characters", field, MAX_URL_LENGTH));
    }

    Ok(())
}

/// Trim optional text, turning blank input into `None`.
pub(crate) fn normalize_optional(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Build a URL slug from free text: ASCII alphanumerics are kept lower-cased,
/// every other run of characters collapses into one hyphen.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }

        if slug.len() >= MAX_SLUG_LENGTH {
            break;
        }
    }

    slug.truncate(MAX_SLUG_LENGTH);
    slug.trim_end_matches('-').to_string()
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LENGTH
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Spring Exhibition 2024"), "spring-exhibition-2024");
        assert_eq!(slugify("  Oil & Water!! "), "oil-water");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("!!!"), "");
        assert!(slugify(&"word ".repeat(100)).len() <= MAX_SLUG_LENGTH);
        assert!(is_valid_slug(&slugify(&"word ".repeat(100))));
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("blue-period"));
        assert!(is_valid_slug("2024"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Blue-Period"));
        assert!(!is_valid_slug("-blue"));
        assert!(!is_valid_slug("blue-"));
        assert!(!is_valid_slug("blue--period"));
        assert!(!is_valid_slug("blue period"));
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Title", "Sunflowers").is_ok());
        assert!(validate_title("Title", "   ").is_err());
        assert!(validate_title("Title", &"a".repeat(MAX_TITLE_LENGTH)).is_ok());
        assert!(validate_title("Title", &"a".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("Image URL", "https://cdn.example.com/a.jpg").is_ok());
        assert!(validate_url("Image URL", "http://example.com").is_ok());
        assert!(validate_url("Image URL", "ftp://example.com/a.jpg").is_err());
        assert!(validate_url("Image URL", "example.com/a.jpg").is_err());
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(Some(&"  text ".to_string())), Some("text".to_string()));
        assert_eq!(normalize_optional(Some(&"   ".to_string())), None);
        assert_eq!(normalize_optional(None), None);
    }
}
