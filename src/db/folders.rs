use tokio_postgres::Row;
use tracing::info;
use uuid::Uuid;

use super::{param_refs, Database, UpdateSet};
use crate::error::ApiError;
use crate::models::{CreateFolderRequest, Folder, UpdateFolderRequest};

const FOLDER_COLUMNS: &str = "id, name, slug, description, position, created_at, updated_at";

fn row_to_folder(row: &Row) -> Folder {
    Folder {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        description: row.get("description"),
        position: row.get("position"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl Database {
    pub async fn create_folder(&self, request: CreateFolderRequest) -> Result<Folder, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let folder = request.into_folder();
        let client = self.get_connection().await?;

        let query = format!(
            r#"
            INSERT INTO folders (id, name, slug, description, position, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            FOLDER_COLUMNS
        );

        let row = client
            .query_one(
                &query,
                &[
                    &folder.id,
                    &folder.name,
                    &folder.slug,
                    &folder.description,
                    &folder.position,
                    &folder.created_at,
                    &folder.updated_at,
                ],
            )
            .await
            .map_err(ApiError::from)?;

        let created = row_to_folder(&row);
        info!("Created folder {} ({})", created.id, created.slug);
        Ok(created)
    }

    pub async fn get_folder_by_id(&self, folder_id: Uuid) -> Result<Folder, ApiError> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM folders WHERE id = $1", FOLDER_COLUMNS);

        let row = client
            .query_opt(&query, &[&folder_id])
            .await
            .map_err(ApiError::from)?;

        row.as_ref()
            .map(row_to_folder)
            .ok_or_else(|| ApiError::not_found(format!("Folder with id {}", folder_id)))
    }

    /// Folders in display order.
    pub async fn get_all_folders(&self) -> Result<Vec<Folder>, ApiError> {
        let client = self.get_connection().await?;
        let query = format!(
            "SELECT {} FROM folders ORDER BY position ASC, name ASC",
            FOLDER_COLUMNS
        );

        let rows = client.query(&query, &[]).await.map_err(ApiError::from)?;

        Ok(rows.iter().map(row_to_folder).collect())
    }

    pub async fn update_folder(
        &self,
        folder_id: Uuid,
        request: UpdateFolderRequest,
    ) -> Result<Folder, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let mut update = UpdateSet::new();
        update
            .set_if("name", request.name.as_ref().map(|n| n.trim().to_string()))
            .set_if("slug", request.slug.as_ref().map(|s| s.trim().to_string()))
            .set_if("description", request.get_normalized_description())
            .set_if("position", request.position);

        let (query, params) = update.into_statement("folders", folder_id, FOLDER_COLUMNS);

        let client = self.get_connection().await?;
        let row = client
            .query_opt(&query, &param_refs(&params))
            .await
            .map_err(ApiError::from)?;

        match row {
            Some(row) => {
                let folder = row_to_folder(&row);
                info!("Updated folder with id: {}", folder.id);
                Ok(folder)
            }
            None => Err(ApiError::not_found(format!("Folder with id {}", folder_id))),
        }
    }

    /// Paintings in the folder are kept and become unfiled (`ON DELETE SET NULL`).
    pub async fn delete_folder(&self, folder_id: Uuid) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        let rows_affected = client
            .execute("DELETE FROM folders WHERE id = $1", &[&folder_id])
            .await
            .map_err(ApiError::from)?;

        if rows_affected == 0 {
            Err(ApiError::not_found(format!("Folder with id {}", folder_id)))
        } else {
            info!("Deleted folder with id: {}", folder_id);
            Ok(())
        }
    }
}
