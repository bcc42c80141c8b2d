use std::sync::Arc;

use anyhow::Result;

use crate::auth::GoogleVerifier;
use crate::config::Config;
use crate::db::Database;
use crate::error::ApiError;
use crate::instagram::InstagramClient;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub google: Arc<GoogleVerifier>,
    pub instagram: Option<Arc<InstagramClient>>,
    pub admin_emails: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(db: Database, config: &Config) -> Result<Self> {
        let google = GoogleVerifier::new(&config.google)?;
        let instagram = config
            .instagram
            .as_ref()
            .map(InstagramClient::new)
            .transpose()?;

        Ok(AppState {
            db: Arc::new(db),
            google: Arc::new(google),
            instagram: instagram.map(Arc::new),
            admin_emails: Arc::new(config.admin_emails.clone()),
        })
    }

    /// The Instagram client, or 503 when the integration is not configured.
    pub fn instagram(&self) -> Result<Arc<InstagramClient>, ApiError> {
        self.instagram
            .clone()
            .ok_or_else(|| ApiError::Unavailable("Instagram integration is not configured".to_string()))
    }
}
