use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use super::{double_option, normalize_optional, validate_title, validate_url};

pub const MAX_IMAGES: usize = 10;
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;
const MAX_DESCRIPTION_LENGTH: usize = 10000;
const MAX_MEDIUM_LENGTH: usize = 200;

/// A catalog entry. The first image URL is the cover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Painting {
    pub id: Uuid,
    pub folder_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub medium: Option<String>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub year: Option<i32>,
    pub price: Option<i32>,
    pub sold: bool,
    pub featured: bool,
    pub image_urls: Vec<String>,
    pub instagram_media_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatePaintingRequest {
    pub folder_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub medium: Option<String>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub year: Option<i32>,
    pub price: Option<i32>,
    #[serde(default)]
    pub sold: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Partial update. Nullable columns use `Option<Option<_>>` so a client can
/// clear them by sending `null`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePaintingRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub folder_id: Option<Option<Uuid>>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub medium: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub width_cm: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub height_cm: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub price: Option<Option<i32>>,
    pub sold: Option<bool>,
    pub featured: Option<bool>,
    pub image_urls: Option<Vec<String>>,
}

impl Painting {
    pub fn is_available(&self) -> bool {
        !self.sold
    }
}

fn validate_dimension(field: &str, value: Option<f64>) -> Result<(), String> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(format!("{} must be a positive number", field)),
        _ => Ok(()),
    }
}

fn validate_year(year: Option<i32>) -> Result<(), String> {
    match year {
        Some(y) if !(MIN_YEAR..=MAX_YEAR).contains(&y) => {
            Err(format!("Year must be between {} and {}", MIN_YEAR, MAX_YEAR))
        }
        _ => Ok(()),
    }
}

fn validate_price(price: Option<i32>) -> Result<(), String> {
    match price {
        Some(p) if p < 0 => Err("Price cannot be negative".to_string()),
        _ => Ok(()),
    }
}

fn validate_images(image_urls: &[String]) -> Result<(), String> {
    if image_urls.len() > MAX_IMAGES {
        return Err(format!("A painting cannot have more than {} images", MAX_IMAGES));
    }

    image_urls
        .iter()
        .try_for_each(|url| validate_url("Image URL", url))
}

fn validate_text(field: &str, value: Option<&String>, max: usize) -> Result<(), String> {
    match value {
        Some(v) if v.len() > max => Err(format!("{} cannot exceed {} characters", field, max)),
        _ => Ok(()),
    }
}

fn normalize_images(image_urls: &[String]) -> Vec<String> {
    image_urls.iter().map(|url| url.trim().to_string()).collect()
}

impl CreatePaintingRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_title("Title", &self.title)?;
        validate_text("Description", self.description.as_ref(), MAX_DESCRIPTION_LENGTH)?;
        validate_text("Medium", self.medium.as_ref(), MAX_MEDIUM_LENGTH)?;
        validate_dimension("Width", self.width_cm)?;
        validate_dimension("Height", self.height_cm)?;
        validate_year(self.year)?;
        validate_price(self.price)?;
        validate_images(&self.image_urls)?;

        Ok(())
    }

    pub fn into_painting(self) -> Painting {
        let now = Utc::now();

        Painting {
            id: Uuid::new_v4(),
            folder_id: self.folder_id,
            title: self.title.trim().to_string(),
            description: normalize_optional(self.description.as_ref()),
            medium: normalize_optional(self.medium.as_ref()),
            width_cm: self.width_cm,
            height_cm: self.height_cm,
            year: self.year,
            price: self.price,
            sold: self.sold,
            featured: self.featured,
            image_urls: normalize_images(&self.image_urls),
            instagram_media_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl UpdatePaintingRequest {
    pub fn is_empty(&self) -> bool {
        self.folder_id.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.medium.is_none()
            && self.width_cm.is_none()
            && self.height_cm.is_none()
            && self.year.is_none()
            && self.price.is_none()
            && self.sold.is_none()
            && self.featured.is_none()
            && self.image_urls.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err("At least one field must be provided for update".to_string());
        }

        if let Some(ref title) = self.title {
            validate_title("Title", title)?;
        }
        validate_text("Description", self.description.clone().flatten().as_ref(), MAX_DESCRIPTION_LENGTH)?;
        validate_text("Medium", self.medium.clone().flatten().as_ref(), MAX_MEDIUM_LENGTH)?;
        validate_dimension("Width", self.width_cm.flatten())?;
        validate_dimension("Height", self.height_cm.flatten())?;
        validate_year(self.year.flatten())?;
        validate_price(self.price.flatten())?;

        if let Some(ref image_urls) = self.image_urls {
            validate_images(image_urls)?;
        }

        Ok(())
    }

    pub fn get_normalized_title(&self) -> Option<String> {
        self.title.as_ref().map(|t| t.trim().to_string())
    }

    pub fn get_normalized_description(&self) -> Option<Option<String>> {
        self.description.as_ref().map(|d| normalize_optional(d.as_ref()))
    }

    pub fn get_normalized_medium(&self) -> Option<Option<String>> {
        self.medium.as_ref().map(|m| normalize_optional(m.as_ref()))
    }

    pub fn get_normalized_image_urls(&self) -> Option<Vec<String>> {
        self.image_urls.as_deref().map(normalize_images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreatePaintingRequest {
        CreatePaintingRequest {
            title: "Harbour at Dusk".to_string(),
            medium: Some("Oil on canvas".to_string()),
            width_cm: Some(60.0),
            height_cm: Some(40.0),
            year: Some(2023),
            price: Some(1200),
            image_urls: vec!["https://cdn.example.com/harbour.jpg".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_create_painting_request_validation() {
        assert!(valid_request().validate().is_ok());

        let mut request = valid_request();
        request.title = "  ".to_string();
        assert!(request.validate().is_err());

        let mut request = valid_request();
        request.year = Some(1850);
        assert!(request.validate().is_err());

        let mut request = valid_request();
        request.width_cm = Some(0.0);
        assert!(request.validate().is_err());

        let mut request = valid_request();
        request.height_cm = Some(f64::NAN);
        assert!(request.validate().is_err());

        let mut request = valid_request();
        request.price = Some(-5);
        assert!(request.validate().is_err());

        let mut request = valid_request();
        request.image_urls = vec!["file:///tmp/a.jpg".to_string()];
        assert!(request.validate().is_err());

        let mut request = valid_request();
        request.image_urls = vec!["https://cdn.example.com/a.jpg".to_string(); MAX_IMAGES + 1];
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_into_painting_normalizes() {
        let mut request = valid_request();
        request.title = "  Harbour at Dusk ".to_string();
        request.description = Some("  ".to_string());
        request.image_urls = vec![" https://cdn.example.com/harbour.jpg ".to_string()];

        let painting = request.into_painting();
        assert_eq!(painting.title, "Harbour at Dusk");
        assert_eq!(painting.description, None);
        assert_eq!(painting.image_urls, vec!["https://cdn.example.com/harbour.jpg".to_string()]);
        assert!(painting.is_available());
        assert_eq!(painting.instagram_media_id, None);
        assert_eq!(painting.created_at, painting.updated_at);
    }

    #[test]
    fn test_create_painting_request_defaults() {
        let request: CreatePaintingRequest =
            serde_json::from_str(r#"{"title": "Study"}"#).expect("valid json");
        assert!(!request.sold);
        assert!(!request.featured);
        assert!(request.image_urls.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_painting_request() {
        let empty: UpdatePaintingRequest = serde_json::from_str("{}").expect("valid json");
        assert!(empty.is_empty());
        assert!(empty.validate().is_err());

        let clear: UpdatePaintingRequest =
            serde_json::from_str(r#"{"folder_id": null, "price": null}"#).expect("valid json");
        assert_eq!(clear.folder_id, Some(None));
        assert_eq!(clear.price, Some(None));
        assert!(clear.validate().is_ok());

        let sold: UpdatePaintingRequest =
            serde_json::from_str(r#"{"sold": true}"#).expect("valid json");
        assert!(sold.validate().is_ok());
        assert_eq!(sold.price, None);

        let bad_year: UpdatePaintingRequest =
            serde_json::from_str(r#"{"year": 3000}"#).expect("valid json");
        assert!(bad_year.validate().is_err());
    }

    #[test]
    fn test_update_painting_normalized_fields() {
        let request: UpdatePaintingRequest = serde_json::from_str(
            r#"{"title": " New ", "medium": "  ", "image_urls": [" https://a.example/x.jpg "]}"#,
        )
        .expect("valid json");

        assert_eq!(request.get_normalized_title(), Some("New".to_string()));
        assert_eq!(request.get_normalized_medium(), Some(None));
        assert_eq!(request.get_normalized_description(), None);
        assert_eq!(
            request.get_normalized_image_urls(),
            Some(vec!["https://a.example/x.jpg".to_string()])
        );
    }
}
