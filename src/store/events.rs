use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::StoreError;

/// Calendar event row. Times are `timestamp without time zone`: the
/// extraction pipeline produces naive local stamps and the client renders
/// them as such.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub is_all_day: bool,
    pub location: Option<String>,
    pub color: Option<String>,
    pub original_input: Option<String>,
    pub confidence: Option<i32>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(default)]
    pub is_all_day: bool,
    pub location: Option<String>,
    pub color: Option<String>,
    pub original_input: Option<String>,
    pub confidence: Option<i32>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub is_all_day: Option<bool>,
    pub location: Option<String>,
    pub color: Option<String>,
    pub confidence: Option<i32>,
    pub status: Option<String>,
}

const EVENT_COLUMNS: &str = "id, user_id, title, description, start_time, end_time, is_all_day, \
                             location, color, original_input, confidence, status, created_at, \
                             updated_at";

pub async fn list_events(
    pool: &PgPool,
    user_id: Uuid,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<Vec<EventRecord>, StoreError> {
    let rows = sqlx::query_as::<_, EventRecord>(&format!(
        "SELECT {EVENT_COLUMNS} FROM events \
         WHERE user_id = $1 \
           AND ($2::timestamp IS NULL OR start_time >= $2) \
           AND ($3::timestamp IS NULL OR end_time <= $3) \
         ORDER BY start_time ASC"
    ))
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_event(pool: &PgPool, id: Uuid) -> Result<EventRecord, StoreError> {
    sqlx::query_as::<_, EventRecord>(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound)
}

pub async fn create_event(pool: &PgPool, event: &NewEvent) -> Result<EventRecord, StoreError> {
    let row = sqlx::query_as::<_, EventRecord>(&format!(
        "INSERT INTO events (id, user_id, title, description, start_time, end_time, is_all_day, \
                             location, color, original_input, confidence, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'confirmed') \
         RETURNING {EVENT_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(event.user_id)
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.start_time)
    .bind(event.end_time)
    .bind(event.is_all_day)
    .bind(&event.location)
    .bind(&event.color)
    .bind(&event.original_input)
    .bind(event.confidence)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_event(
    pool: &PgPool,
    id: Uuid,
    patch: &EventPatch,
) -> Result<EventRecord, StoreError> {
    sqlx::query_as::<_, EventRecord>(&format!(
        "UPDATE events SET \
             title = COALESCE($2::text, title), \
             description = COALESCE($3::text, description), \
             start_time = COALESCE($4::timestamp, start_time), \
             end_time = COALESCE($5::timestamp, end_time), \
             is_all_day = COALESCE($6::boolean, is_all_day), \
             location = COALESCE($7::text, location), \
             color = COALESCE($8::text, color), \
             confidence = COALESCE($9::integer, confidence), \
             status = COALESCE($10::text, status), \
             updated_at = now() \
         WHERE id = $1 \
         RETURNING {EVENT_COLUMNS}"
    ))
    .bind(id)
    .bind(&patch.title)
    .bind(&patch.description)
    .bind(patch.start_time)
    .bind(patch.end_time)
    .bind(patch.is_all_day)
    .bind(&patch.location)
    .bind(&patch.color)
    .bind(patch.confidence)
    .bind(&patch.status)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound)
}

pub async fn delete_event(pool: &PgPool, id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}
