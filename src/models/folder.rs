use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use super::{double_option, normalize_optional, slugify, validate_slug, validate_title, Painting};

const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// A gallery collection that groups paintings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct FolderWithPaintings {
    #[serde(flatten)]
    pub folder: Folder,
    pub paintings: Vec<Painting>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub position: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateFolderRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub position: Option<i32>,
}

impl Folder {
    pub fn new(name: String, slug: String, description: Option<String>, position: i32) -> Self {
        let now = Utc::now();

        Folder {
            id: Uuid::new_v4(),
            name,
            slug,
            description,
            position,
            created_at: now,
            updated_at: now,
        }
    }
}

impl CreateFolderRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_title("Name", &self.name)?;

        match self.slug {
            Some(ref slug) => validate_slug(slug.trim())?,
            None if slugify(&self.name).is_empty() => {
                return Err("A slug is required when the name has no letters or digits".to_string());
            }
            None => {}
        }

        if let Some(ref description) = self.description {
            if description.len() > MAX_DESCRIPTION_LENGTH {
                return Err(format!("Description cannot exceed {} characters", MAX_DESCRIPTION_LENGTH));
            }
        }

        if matches!(self.position, Some(p) if p < 0) {
            return Err("Position cannot be negative".to_string());
        }

        Ok(())
    }

    pub fn into_folder(self) -> Folder {
        let name = self.name.trim().to_string();
        let slug = self
            .slug
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| slugify(&name));

        Folder::new(
            name,
            slug,
            normalize_optional(self.description.as_ref()),
            self.position.unwrap_or(0),
        )
    }
}

impl UpdateFolderRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.position.is_none()
        {
            return Err("At least one field must be provided for update".to_string());
        }

        if let Some(ref name) = self.name {
            validate_title("Name", name)?;
        }

        if let Some(ref slug) = self.slug {
            validate_slug(slug.trim())?;
        }

        if let Some(Some(ref description)) = self.description {
            if description.len() > MAX_DESCRIPTION_LENGTH {
                return Err(format!("Description cannot exceed {} characters", MAX_DESCRIPTION_LENGTH));
            }
        }

        if matches!(self.position, Some(p) if p < 0) {
            return Err("Position cannot be negative".to_string());
        }

        Ok(())
    }

    pub fn get_normalized_description(&self) -> Option<Option<String>> {
        self.description
            .as_ref()
            .map(|d| normalize_optional(d.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(name: &str, slug: Option<&str>) -> CreateFolderRequest {
        CreateFolderRequest {
            name: name.to_string(),
            slug: slug.map(str::to_string),
            description: None,
            position: None,
        }
    }

    #[test]
    fn test_create_folder_request_validation() {
        assert!(create_request("Landscapes", None).validate().is_ok());
        assert!(create_request("Landscapes", Some("land")).validate().is_ok());
        assert!(create_request("", None).validate().is_err());
        assert!(create_request("Landscapes", Some("Land Scapes")).validate().is_err());
        assert!(create_request("???", None).validate().is_err());
        assert!(create_request("???", Some("misc")).validate().is_ok());

        let mut negative = create_request("Landscapes", None);
        negative.position = Some(-1);
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_into_folder_derives_slug() {
        let mut request = create_request("  Sea & Sky  ", None);
        request.description = Some("   ".to_string());

        let folder = request.into_folder();
        assert_eq!(folder.name, "Sea & Sky");
        assert_eq!(folder.slug, "sea-sky");
        assert_eq!(folder.description, None);
        assert_eq!(folder.position, 0);
    }

    #[test]
    fn test_update_folder_request_requires_a_field() {
        assert!(UpdateFolderRequest::default().validate().is_err());

        let request: UpdateFolderRequest =
            serde_json::from_str(r#"{"position": 3}"#).expect("valid json");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_folder_request_can_clear_description() {
        let request: UpdateFolderRequest =
            serde_json::from_str(r#"{"description": null}"#).expect("valid json");
        assert!(request.validate().is_ok());
        assert_eq!(request.get_normalized_description(), Some(None));

        let request: UpdateFolderRequest =
            serde_json::from_str(r#"{"name": "Portraits"}"#).expect("valid json");
        assert_eq!(request.get_normalized_description(), None);
    }
}
