use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use super::{double_option, normalize_optional, validate_title, validate_url};

const MAX_DESCRIPTION_LENGTH: usize = 10000;

/// An exhibition or fair the artist takes part in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which events a listing returns, relative to the current time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventWindow {
    /// Events that have not finished yet, soonest first.
    #[default]
    Upcoming,
    /// Finished events, most recent first.
    Past,
    All,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub ends_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
}

impl Event {
    /// Apply a validated update, returning an error when the resulting
    /// date range would be inverted.
    pub fn apply(&mut self, request: &UpdateEventRequest) -> Result<(), String> {
        if let Some(ref title) = request.title {
            self.title = title.trim().to_string();
        }
        if let Some(ref description) = request.description {
            self.description = normalize_optional(description.as_ref());
        }
        if let Some(ref location) = request.location {
            self.location = location.trim().to_string();
        }
        if let Some(starts_at) = request.starts_at {
            self.starts_at = starts_at;
        }
        if let Some(ends_at) = request.ends_at {
            self.ends_at = ends_at;
        }
        if let Some(ref url) = request.url {
            self.url = normalize_optional(url.as_ref());
        }
        if let Some(ref image_url) = request.image_url {
            self.image_url = normalize_optional(image_url.as_ref());
        }

        validate_range(self.starts_at, self.ends_at)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn validate_range(starts_at: DateTime<Utc>, ends_at: Option<DateTime<Utc>>) -> Result<(), String> {
    match ends_at {
        Some(end) if end < starts_at => Err("Event cannot end before it starts".to_string()),
        _ => Ok(()),
    }
}

fn validate_optional_url(field: &str, url: Option<&String>) -> Result<(), String> {
    match url {
        Some(u) if !u.trim().is_empty() => validate_url(field, u),
        _ => Ok(()),
    }
}

fn validate_description(description: Option<&String>) -> Result<(), String> {
    match description {
        Some(d) if d.len() > MAX_DESCRIPTION_LENGTH => Err(format!(
            "Description cannot exceed {} characters",
            MAX_DESCRIPTION_LENGTH
        )),
        _ => Ok(()),
    }
}

impl CreateEventRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_title("Title", &self.title)?;
        validate_title("Location", &self.location)?;
        validate_description(self.description.as_ref())?;
        validate_range(self.starts_at, self.ends_at)?;
        validate_optional_url("URL", self.url.as_ref())?;
        validate_optional_url("Image URL", self.image_url.as_ref())?;

        Ok(())
    }

    pub fn into_event(self) -> Event {
        let now = Utc::now();

        Event {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            description: normalize_optional(self.description.as_ref()),
            location: self.location.trim().to_string(),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            url: normalize_optional(self.url.as_ref()),
            image_url: normalize_optional(self.image_url.as_ref()),
            created_at: now,
            updated_at: now,
        }
    }
}

impl UpdateEventRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.starts_at.is_none()
            && self.ends_at.is_none()
            && self.url.is_none()
            && self.image_url.is_none()
        {
            return Err("At least one field must be provided for update".to_string());
        }

        if let Some(ref title) = self.title {
            validate_title("Title", title)?;
        }
        if let Some(ref location) = self.location {
            validate_title("Location", location)?;
        }
        if let Some(Some(ref description)) = self.description {
            validate_description(Some(description))?;
        }
        if let Some(Some(ref url)) = self.url {
            validate_optional_url("URL", Some(url))?;
        }
        if let Some(Some(ref image_url)) = self.image_url {
            validate_optional_url("Image URL", Some(image_url))?;
        }
        if let (Some(start), Some(end)) = (self.starts_at, self.ends_at.flatten()) {
            validate_range(start, Some(end))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn request() -> CreateEventRequest {
        CreateEventRequest {
            title: "Autumn Salon".to_string(),
            description: None,
            location: "Galerie Nord, Hamburg".to_string(),
            starts_at: Utc.with_ymd_and_hms(2026, 10, 1, 18, 0, 0).unwrap(),
            ends_at: Some(Utc.with_ymd_and_hms(2026, 10, 21, 18, 0, 0).unwrap()),
            url: None,
            image_url: None,
        }
    }

    #[test]
    fn test_create_event_request_validation() {
        assert!(request().validate().is_ok());

        let mut inverted = request();
        inverted.ends_at = Some(inverted.starts_at - Duration::days(1));
        assert!(inverted.validate().is_err());

        let mut no_location = request();
        no_location.location = " ".to_string();
        assert!(no_location.validate().is_err());

        let mut bad_url = request();
        bad_url.url = Some("galerie-nord".to_string());
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn test_apply_update_checks_range() {
        let mut event = request().into_event();

        let update: UpdateEventRequest =
            serde_json::from_str(r#"{"ends_at": null, "location": " Kunsthalle "}"#).expect("valid json");
        assert!(update.validate().is_ok());
        assert!(event.apply(&update).is_ok());
        assert_eq!(event.ends_at, None);
        assert_eq!(event.location, "Kunsthalle");

        let update = UpdateEventRequest {
            ends_at: Some(Some(event.starts_at - Duration::hours(1))),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        assert!(event.apply(&update).is_err());
    }

    #[test]
    fn test_event_window_deserialization() {
        let window: EventWindow = serde_json::from_str(r#""past""#).expect("valid json");
        assert_eq!(window, EventWindow::Past);
        assert_eq!(EventWindow::default(), EventWindow::Upcoming);
        assert!(serde_json::from_str::<EventWindow>(r#""later""#).is_err());
    }
}
