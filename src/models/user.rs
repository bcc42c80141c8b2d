use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// A visitor who signed in with Google, created on first verified request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(skip_serializing, default)]
    pub google_sub: String,
    pub email: String,
    pub name: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity claims taken from a verified Google ID token.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleProfile {
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl GoogleProfile {
    /// Email lower-cased so that admin matching and the unique index agree.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    /// Display name, falling back to the local part of the email.
    pub fn display_name(&self) -> String {
        self.name
            .as_ref()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| {
                self.normalized_email()
                    .split('@')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            })
    }
}

impl User {
    pub fn is_admin(&self, admin_emails: &[String]) -> bool {
        let email = self.email.to_lowercase();
        admin_emails.iter().any(|admin| *admin == email)
    }
}

/// Response body for `GET /api/me`.
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    #[serde(flatten)]
    pub user: User,
    pub is_admin: bool,
}
