use tokio_postgres::Row;
use tracing::info;
use uuid::Uuid;

use super::{param_refs, Database, UpdateSet};
use crate::error::ApiError;
use crate::models::{CreatePaintingRequest, Painting, UpdatePaintingRequest};

const PAINTING_COLUMNS: &str = "id, folder_id, title, description, medium, width_cm, height_cm, \
    year, price, sold, featured, image_urls, instagram_media_id, created_at, updated_at";

fn row_to_painting(row: &Row) -> Painting {
    Painting {
        id: row.get("id"),
        folder_id: row.get("folder_id"),
        title: row.get("title"),
        description: row.get("description"),
        medium: row.get("medium"),
        width_cm: row.get("width_cm"),
        height_cm: row.get("height_cm"),
        year: row.get("year"),
        price: row.get("price"),
        sold: row.get("sold"),
        featured: row.get("featured"),
        image_urls: row.get("image_urls"),
        instagram_media_id: row.get("instagram_media_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl Database {
    pub async fn create_painting(&self, request: CreatePaintingRequest) -> Result<Painting, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let painting = request.into_painting();
        let client = self.get_connection().await?;

        let query = format!(
            r#"
            INSERT INTO paintings (id, folder_id, title, description, medium, width_cm, height_cm,
                                   year, price, sold, featured, image_urls, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            PAINTING_COLUMNS
        );

        let row = client
            .query_one(
                &query,
                &[
                    &painting.id,
                    &painting.folder_id,
                    &painting.title,
                    &painting.description,
                    &painting.medium,
                    &painting.width_cm,
                    &painting.height_cm,
                    &painting.year,
                    &painting.price,
                    &painting.sold,
                    &painting.featured,
                    &painting.image_urls,
                    &painting.created_at,
                    &painting.updated_at,
                ],
            )
            .await
            .map_err(ApiError::from)?;

        let created = row_to_painting(&row);
        info!("Created painting with id: {}", created.id);
        Ok(created)
    }

    pub async fn get_painting_by_id(&self, painting_id: Uuid) -> Result<Painting, ApiError> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM paintings WHERE id = $1", PAINTING_COLUMNS);

        let row = client
            .query_opt(&query, &[&painting_id])
            .await
            .map_err(ApiError::from)?;

        row.as_ref()
            .map(row_to_painting)
            .ok_or_else(|| ApiError::not_found(format!("Painting with id {}", painting_id)))
    }

    /// All paintings newest first, optionally restricted to one folder.
    pub async fn get_all_paintings(&self, folder_id: Option<Uuid>) -> Result<Vec<Painting>, ApiError> {
        let client = self.get_connection().await?;

        let rows = match folder_id {
            Some(folder_id) => {
                let query = format!(
                    "SELECT {} FROM paintings WHERE folder_id = $1 ORDER BY created_at DESC",
                    PAINTING_COLUMNS
                );
                client.query(&query, &[&folder_id]).await
            }
            None => {
                let query = format!("SELECT {} FROM paintings ORDER BY created_at DESC", PAINTING_COLUMNS);
                client.query(&query, &[]).await
            }
        }
        .map_err(ApiError::from)?;

        Ok(rows.iter().map(row_to_painting).collect())
    }

    pub async fn update_painting(
        &self,
        painting_id: Uuid,
        request: UpdatePaintingRequest,
    ) -> Result<Painting, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let mut update = UpdateSet::new();
        update
            .set_if("folder_id", request.folder_id)
            .set_if("title", request.get_normalized_title())
            .set_if("description", request.get_normalized_description())
            .set_if("medium", request.get_normalized_medium())
            .set_if("width_cm", request.width_cm)
            .set_if("height_cm", request.height_cm)
            .set_if("year", request.year)
            .set_if("price", request.price)
            .set_if("sold", request.sold)
            .set_if("featured", request.featured)
            .set_if("image_urls", request.get_normalized_image_urls());

        let (query, params) = update.into_statement("paintings", painting_id, PAINTING_COLUMNS);

        let client = self.get_connection().await?;
        let row = client
            .query_opt(&query, &param_refs(&params))
            .await
            .map_err(ApiError::from)?;

        match row {
            Some(row) => {
                let painting = row_to_painting(&row);
                info!("Updated painting with id: {}", painting.id);
                Ok(painting)
            }
            None => Err(ApiError::not_found(format!("Painting with id {}", painting_id))),
        }
    }

    /// Comments on the painting are removed with it (`ON DELETE CASCADE`).
    pub async fn delete_painting(&self, painting_id: Uuid) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        let rows_affected = client
            .execute("DELETE FROM paintings WHERE id = $1", &[&painting_id])
            .await
            .map_err(ApiError::from)?;

        if rows_affected == 0 {
            Err(ApiError::not_found(format!("Painting with id {}", painting_id)))
        } else {
            info!("Deleted painting with id: {}", painting_id);
            Ok(())
        }
    }

    /// Remember the Instagram media id returned by the last publish.
    pub async fn set_painting_instagram_media(
        &self,
        painting_id: Uuid,
        media_id: &str,
    ) -> Result<Painting, ApiError> {
        let mut update = UpdateSet::new();
        update.set("instagram_media_id", media_id.to_string());

        let (query, params) = update.into_statement("paintings", painting_id, PAINTING_COLUMNS);

        let client = self.get_connection().await?;
        let row = client
            .query_opt(&query, &param_refs(&params))
            .await
            .map_err(ApiError::from)?;

        row.as_ref()
            .map(row_to_painting)
            .ok_or_else(|| ApiError::not_found(format!("Painting with id {}", painting_id)))
    }
}
