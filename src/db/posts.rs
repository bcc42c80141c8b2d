use tokio_postgres::Row;
use tracing::info;
use uuid::Uuid;

use super::{param_refs, Database, UpdateSet};
use crate::error::ApiError;
use crate::models::{CreatePostRequest, Post, UpdatePostRequest};

const POST_COLUMNS: &str =
    "id, title, slug, content, cover_image_url, published, published_at, created_at, updated_at";

fn row_to_post(row: &Row) -> Post {
    Post {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        content: row.get("content"),
        cover_image_url: row.get("cover_image_url"),
        published: row.get("published"),
        published_at: row.get("published_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl Database {
    pub async fn create_post(&self, request: CreatePostRequest) -> Result<Post, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let post = request.into_post();
        let client = self.get_connection().await?;

        let query = format!(
            r#"
            INSERT INTO posts (id, title, slug, content, cover_image_url, published, published_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            POST_COLUMNS
        );

        let row = client
            .query_one(
                &query,
                &[
                    &post.id,
                    &post.title,
                    &post.slug,
                    &post.content,
                    &post.cover_image_url,
                    &post.published,
                    &post.published_at,
                    &post.created_at,
                    &post.updated_at,
                ],
            )
            .await
            .map_err(ApiError::from)?;

        let created = row_to_post(&row);
        info!("Created post {} ({})", created.id, created.slug);
        Ok(created)
    }

    pub async fn get_post_by_id(&self, post_id: Uuid) -> Result<Post, ApiError> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);

        let row = client
            .query_opt(&query, &[&post_id])
            .await
            .map_err(ApiError::from)?;

        row.as_ref()
            .map(row_to_post)
            .ok_or_else(|| ApiError::not_found(format!("Post with id {}", post_id)))
    }

    pub async fn get_post_by_slug(&self, slug: &str) -> Result<Post, ApiError> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM posts WHERE slug = $1", POST_COLUMNS);

        let row = client
            .query_opt(&query, &[&slug])
            .await
            .map_err(ApiError::from)?;

        row.as_ref()
            .map(row_to_post)
            .ok_or_else(|| ApiError::not_found(format!("Post '{}'", slug)))
    }

    /// Posts ordered by publication (or creation, for drafts) time, newest first.
    pub async fn get_all_posts(&self, published_only: bool) -> Result<Vec<Post>, ApiError> {
        let client = self.get_connection().await?;
        let filter = if published_only { "WHERE published" } else { "" };
        let query = format!(
            "SELECT {} FROM posts {} ORDER BY COALESCE(published_at, created_at) DESC",
            POST_COLUMNS, filter
        );

        let rows = client.query(&query, &[]).await.map_err(ApiError::from)?;

        Ok(rows.iter().map(row_to_post).collect())
    }

    /// Publishing a post for the first time stamps `published_at`; later
    /// unpublish / republish cycles keep the original date.
    pub async fn update_post(&self, post_id: Uuid, request: UpdatePostRequest) -> Result<Post, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let mut update = UpdateSet::new();
        update
            .set_if("title", request.get_normalized_title())
            .set_if("slug", request.get_normalized_slug())
            .set_if("content", request.get_normalized_content())
            .set_if("cover_image_url", request.get_normalized_cover_image_url())
            .set_if("published", request.published);
        if request.published == Some(true) {
            update.set_expression("published_at = COALESCE(published_at, NOW())");
        }

        let (query, params) = update.into_statement("posts", post_id, POST_COLUMNS);

        let client = self.get_connection().await?;
        let row = client
            .query_opt(&query, &param_refs(&params))
            .await
            .map_err(ApiError::from)?;

        match row {
            Some(row) => {
                let post = row_to_post(&row);
                info!("Updated post with id: {}", post.id);
                Ok(post)
            }
            None => Err(ApiError::not_found(format!("Post with id {}", post_id))),
        }
    }

    pub async fn delete_post(&self, post_id: Uuid) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        let rows_affected = client
            .execute("DELETE FROM posts WHERE id = $1", &[&post_id])
            .await
            .map_err(ApiError::from)?;

        if rows_affected == 0 {
            Err(ApiError::not_found(format!("Post with id {}", post_id)))
        } else {
            info!("Deleted post with id: {}", post_id);
            Ok(())
        }
    }
}
