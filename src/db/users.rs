use tokio_postgres::Row;
use tracing::info;
use uuid::Uuid;

use super::Database;
use crate::error::ApiError;
use crate::models::{GoogleProfile, User};

const USER_COLUMNS: &str = "id, google_sub, email, name, image_url, created_at, updated_at";

fn row_to_user(row: &Row) -> User {
    User {
        id: row.get("id"),
        google_sub: row.get("google_sub"),
        email: row.get("email"),
        name: row.get("name"),
        image_url: row.get("image_url"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl Database {
    /// Insert the Google account on first sight, otherwise refresh its
    /// profile fields. Keyed on the stable Google subject id.
    pub async fn upsert_google_user(&self, profile: &GoogleProfile) -> Result<User, ApiError> {
        let client = self.get_connection().await?;

        let query = format!(
            r#"
            INSERT INTO users (id, google_sub, email, name, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            ON CONFLICT (google_sub) DO UPDATE
                SET email = EXCLUDED.email,
                    name = EXCLUDED.name,
                    image_url = EXCLUDED.image_url,
                    updated_at = NOW()
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = client
            .query_one(
                &query,
                &[
                    &Uuid::new_v4(),
                    &profile.sub,
                    &profile.normalized_email(),
                    &profile.display_name(),
                    &profile.picture,
                ],
            )
            .await
            .map_err(ApiError::from)?;

        let user = row_to_user(&row);
        info!("Signed-in user {} ({})", user.id, user.email);
        Ok(user)
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>, ApiError> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM users ORDER BY created_at DESC", USER_COLUMNS);

        let rows = client.query(&query, &[]).await.map_err(ApiError::from)?;

        Ok(rows.iter().map(row_to_user).collect())
    }
}
