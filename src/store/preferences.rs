use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::StoreError;

pub const DEFAULT_MEETING_DURATION_MINUTES: i32 = 30;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PreferencesRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub timezone: String,
    pub default_meeting_duration: i32,
    pub working_hours_start: String,
    pub working_hours_end: String,
    pub week_starts_on: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesPatch {
    pub timezone: Option<String>,
    pub default_meeting_duration: Option<i32>,
    pub working_hours_start: Option<String>,
    pub working_hours_end: Option<String>,
    pub week_starts_on: Option<i32>,
}

const PREFERENCE_COLUMNS: &str = "id, user_id, timezone, default_meeting_duration, \
                                  working_hours_start, working_hours_end, week_starts_on, \
                                  created_at, updated_at";

/// Fetch the user's preferences, creating the default row on first access.
pub async fn get_or_create_preferences(
    pool: &PgPool,
    user_id: Uuid,
    default_timezone: &str,
) -> Result<PreferencesRecord, StoreError> {
    let existing = sqlx::query_as::<_, PreferencesRecord>(&format!(
        "SELECT {PREFERENCE_COLUMNS} FROM user_preferences WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    if let Some(row) = existing {
        return Ok(row);
    }

    let row = sqlx::query_as::<_, PreferencesRecord>(&format!(
        "INSERT INTO user_preferences \
             (id, user_id, timezone, default_meeting_duration, working_hours_start, \
              working_hours_end, week_starts_on) \
         VALUES ($1, $2, $3, $4, '09:00', '17:00', 0) \
         RETURNING {PREFERENCE_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(default_timezone)
    .bind(DEFAULT_MEETING_DURATION_MINUTES)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_preferences(
    pool: &PgPool,
    user_id: Uuid,
    patch: &PreferencesPatch,
) -> Result<PreferencesRecord, StoreError> {
    sqlx::query_as::<_, PreferencesRecord>(&format!(
        "UPDATE user_preferences SET \
             timezone = COALESCE($2::text, timezone), \
             default_meeting_duration = COALESCE($3::integer, default_meeting_duration), \
             working_hours_start = COALESCE($4::text, working_hours_start), \
             working_hours_end = COALESCE($5::text, working_hours_end), \
             week_starts_on = COALESCE($6::integer, week_starts_on), \
             updated_at = now() \
         WHERE user_id = $1 \
         RETURNING {PREFERENCE_COLUMNS}"
    ))
    .bind(user_id)
    .bind(&patch.timezone)
    .bind(patch.default_meeting_duration)
    .bind(&patch.working_hours_start)
    .bind(&patch.working_hours_end)
    .bind(patch.week_starts_on)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound)
}
