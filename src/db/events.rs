use chrono::Utc;
use tokio_postgres::Row;
use tracing::info;
use uuid::Uuid;

use super::Database;
use crate::error::ApiError;
use crate::models::{CreateEventRequest, Event, EventWindow, UpdateEventRequest};

const EVENT_COLUMNS: &str =
    "id, title, description, location, starts_at, ends_at, url, image_url, created_at, updated_at";

fn row_to_event(row: &Row) -> Event {
    Event {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        location: row.get("location"),
        starts_at: row.get("starts_at"),
        ends_at: row.get("ends_at"),
        url: row.get("url"),
        image_url: row.get("image_url"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn window_clause(window: EventWindow) -> &'static str {
    match window {
        EventWindow::Upcoming => "WHERE COALESCE(ends_at, starts_at) >= $1 ORDER BY starts_at ASC",
        EventWindow::Past => "WHERE COALESCE(ends_at, starts_at) < $1 ORDER BY starts_at DESC",
        EventWindow::All => "ORDER BY starts_at DESC",
    }
}

impl Database {
    pub async fn create_event(&self, request: CreateEventRequest) -> Result<Event, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let event = request.into_event();
        let client = self.get_connection().await?;

        let query = format!(
            r#"
            INSERT INTO events (id, title, description, location, starts_at, ends_at, url, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );

        let row = client
            .query_one(
                &query,
                &[
                    &event.id,
                    &event.title,
                    &event.description,
                    &event.location,
                    &event.starts_at,
                    &event.ends_at,
                    &event.url,
                    &event.image_url,
                    &event.created_at,
                    &event.updated_at,
                ],
            )
            .await
            .map_err(ApiError::from)?;

        let created = row_to_event(&row);
        info!("Created event with id: {}", created.id);
        Ok(created)
    }

    pub async fn get_event_by_id(&self, event_id: Uuid) -> Result<Event, ApiError> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS);

        let row = client
            .query_opt(&query, &[&event_id])
            .await
            .map_err(ApiError::from)?;

        row.as_ref()
            .map(row_to_event)
            .ok_or_else(|| ApiError::not_found(format!("Event with id {}", event_id)))
    }

    pub async fn get_events(&self, window: EventWindow) -> Result<Vec<Event>, ApiError> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM events {}", EVENT_COLUMNS, window_clause(window));

        let rows = match window {
            EventWindow::All => client.query(&query, &[]).await,
            EventWindow::Upcoming | EventWindow::Past => client.query(&query, &[&Utc::now()]).await,
        }
        .map_err(ApiError::from)?;

        Ok(rows.iter().map(row_to_event).collect())
    }

    /// Read-modify-write so the date range can be checked against the
    /// stored values the request leaves untouched.
    pub async fn update_event(&self, event_id: Uuid, request: UpdateEventRequest) -> Result<Event, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let mut event = self.get_event_by_id(event_id).await?;
        event.apply(&request).map_err(ApiError::Validation)?;

        let client = self.get_connection().await?;
        let query = format!(
            r#"
            UPDATE events
            SET title = $1, description = $2, location = $3, starts_at = $4, ends_at = $5,
                url = $6, image_url = $7, updated_at = $8
            WHERE id = $9
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );

        let row = client
            .query_opt(
                &query,
                &[
                    &event.title,
                    &event.description,
                    &event.location,
                    &event.starts_at,
                    &event.ends_at,
                    &event.url,
                    &event.image_url,
                    &event.updated_at,
                    &event_id,
                ],
            )
            .await
            .map_err(ApiError::from)?;

        match row {
            Some(row) => {
                let updated = row_to_event(&row);
                info!("Updated event with id: {}", updated.id);
                Ok(updated)
            }
            None => Err(ApiError::not_found(format!("Event with id {}", event_id))),
        }
    }

    pub async fn delete_event(&self, event_id: Uuid) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        let rows_affected = client
            .execute("DELETE FROM events WHERE id = $1", &[&event_id])
            .await
            .map_err(ApiError::from)?;

        if rows_affected == 0 {
            Err(ApiError::not_found(format!("Event with id {}", event_id)))
        } else {
            info!("Deleted event with id: {}", event_id);
            Ok(())
        }
    }
}
