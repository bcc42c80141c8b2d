use chrono::{DateTime, Utc};
use tracing::info;

use super::Database;
use crate::error::ApiError;

/// The long-lived Instagram token as last persisted.
#[derive(Debug, Clone)]
pub struct StoredInstagramToken {
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Database {
    pub async fn get_instagram_token(&self) -> Result<StoredInstagramToken, ApiError> {
        let client = self.get_connection().await?;

        let row = client
            .query_opt(
                "SELECT access_token, expires_at, updated_at FROM instagram_credentials WHERE id = 1",
                &[],
            )
            .await
            .map_err(ApiError::from)?;

        match row {
            Some(row) => Ok(StoredInstagramToken {
                access_token: row.get("access_token"),
                expires_at: row.get("expires_at"),
                updated_at: row.get("updated_at"),
            }),
            None => Err(ApiError::Unavailable(
                "No Instagram access token has been configured".to_string(),
            )),
        }
    }

    pub async fn save_instagram_token(
        &self,
        access_token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        client
            .execute(
                r#"
                INSERT INTO instagram_credentials (id, access_token, expires_at, updated_at)
                VALUES (1, $1, $2, NOW())
                ON CONFLICT (id) DO UPDATE
                    SET access_token = EXCLUDED.access_token,
                        expires_at = EXCLUDED.expires_at,
                        updated_at = NOW()
                "#,
                &[&access_token, &expires_at],
            )
            .await
            .map_err(ApiError::from)?;

        info!("Stored Instagram access token (expires at {:?})", expires_at);
        Ok(())
    }

    /// Store the configured token only when no token is stored yet. A stored
    /// token always wins over the environment.
    pub async fn seed_instagram_token(&self, access_token: &str) -> Result<bool, ApiError> {
        let client = self.get_connection().await?;

        let inserted = client
            .execute(
                r#"
                INSERT INTO instagram_credentials (id, access_token, expires_at, updated_at)
                VALUES (1, $1, NULL, NOW())
                ON CONFLICT (id) DO NOTHING
                "#,
                &[&access_token],
            )
            .await
            .map_err(ApiError::from)?;

        if inserted > 0 {
            info!("Seeded Instagram access token from configuration");
        }
        Ok(inserted > 0)
    }
}
