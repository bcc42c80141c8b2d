use deadpool_postgres::Object;
use tokio_postgres::Row;
use tracing::info;
use uuid::Uuid;

use super::Database;
use crate::error::ApiError;
use crate::models::{Comment, CommentAuthor, CommentTarget, CreateCommentRequest, User};

fn row_to_comment(target: CommentTarget, row: &Row) -> Comment {
    Comment {
        id: row.get("id"),
        target,
        target_id: row.get("target_id"),
        user_id: row.get("user_id"),
        author: CommentAuthor {
            name: row.get("author_name"),
            image_url: row.get("author_image_url"),
        },
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}

/// SELECT joining the author's display fields, aliased so both comment
/// tables map through `row_to_comment`.
fn select_comments(target: CommentTarget, filter_column: &str) -> String {
    format!(
        r#"
        SELECT c.id, c.{target_column} AS target_id, c.user_id, c.content, c.created_at,
               u.name AS author_name, u.image_url AS author_image_url
        FROM {table} c
        JOIN users u ON u.id = c.user_id
        WHERE c.{filter_column} = $1
        ORDER BY c.created_at ASC
        "#,
        target_column = target.target_column(),
        table = target.table(),
        filter_column = filter_column,
    )
}

/// Parent lookup for comment reads and writes. Draft posts count as missing.
fn visible_parent_query(target: CommentTarget) -> String {
    let visibility = match target {
        CommentTarget::Painting => "",
        CommentTarget::Post => " AND published",
    };
    format!("SELECT 1 FROM {} WHERE id = $1{}", target.parent_table(), visibility)
}

async fn ensure_visible_parent(
    client: &Object,
    target: CommentTarget,
    target_id: Uuid,
) -> Result<(), ApiError> {
    let parent = client
        .query_opt(&visible_parent_query(target), &[&target_id])
        .await
        .map_err(ApiError::from)?;

    match parent {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found(format!("{} with id {}", target.label(), target_id))),
    }
}

impl Database {
    /// Attach a comment by `author` to a painting or published post. A missing
    /// parent is reported as NotFound rather than a foreign key failure.
    pub async fn create_comment(
        &self,
        target: CommentTarget,
        target_id: Uuid,
        author: &User,
        request: CreateCommentRequest,
    ) -> Result<Comment, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let client = self.get_connection().await?;

        ensure_visible_parent(&client, target, target_id).await?;

        let insert_query = format!(
            r#"
            INSERT INTO {table} (id, {target_column}, user_id, content, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, {target_column} AS target_id, user_id, content, created_at
            "#,
            table = target.table(),
            target_column = target.target_column(),
        );

        let content = request.get_normalized_content();
        let row = client
            .query_one(&insert_query, &[&Uuid::new_v4(), &target_id, &author.id, &content])
            .await
            .map_err(ApiError::from)?;

        let comment = Comment {
            id: row.get("id"),
            target,
            target_id: row.get("target_id"),
            user_id: row.get("user_id"),
            author: CommentAuthor {
                name: author.name.clone(),
                image_url: author.image_url.clone(),
            },
            content: row.get("content"),
            created_at: row.get("created_at"),
        };

        info!(
            "User {} commented on {} {} (comment {})",
            author.id,
            target.label().to_lowercase(),
            target_id,
            comment.id
        );
        Ok(comment)
    }

    /// Comments in chronological order. Unknown paintings and draft or
    /// unknown posts are NotFound.
    pub async fn get_comments(&self, target: CommentTarget, target_id: Uuid) -> Result<Vec<Comment>, ApiError> {
        let client = self.get_connection().await?;
        ensure_visible_parent(&client, target, target_id).await?;

        let query = select_comments(target, target.target_column());

        let rows = client
            .query(&query, &[&target_id])
            .await
            .map_err(ApiError::from)?;

        Ok(rows.iter().map(|row| row_to_comment(target, row)).collect())
    }

    pub async fn get_comment_by_id(&self, target: CommentTarget, comment_id: Uuid) -> Result<Comment, ApiError> {
        let client = self.get_connection().await?;
        let query = select_comments(target, "id");

        let row = client
            .query_opt(&query, &[&comment_id])
            .await
            .map_err(ApiError::from)?;

        row.map(|row| row_to_comment(target, &row))
            .ok_or_else(|| ApiError::not_found(format!("Comment with id {}", comment_id)))
    }

    pub async fn delete_comment(&self, target: CommentTarget, comment_id: Uuid) -> Result<(), ApiError> {
        let client = self.get_connection().await?;
        let query = format!("DELETE FROM {} WHERE id = $1", target.table());

        let rows_affected = client
            .execute(&query, &[&comment_id])
            .await
            .map_err(ApiError::from)?;

        if rows_affected == 0 {
            Err(ApiError::not_found(format!("Comment with id {}", comment_id)))
        } else {
            info!("Deleted {} comment with id: {}", target.label().to_lowercase(), comment_id);
            Ok(())
        }
    }
}
