use std::time::Duration;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{StoreError, SyncError};

/// How long a best-effort user sync may run before the caller gives up.
const SYNC_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub email_verified: bool,
    pub provider: String,
    pub provider_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// What the auth provider knows about a user; the source of truth the
/// local row is reconciled against.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub provider_id: Option<String>,
}

impl AuthUser {
    fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        self.email
            .split('@')
            .next()
            .filter(|local| !local.is_empty())
            .unwrap_or("User")
            .to_string()
    }

    fn provider(&self) -> &str {
        self.provider.as_deref().unwrap_or("credentials")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcome {
    AlreadyPresent,
    Created,
    Updated,
}

const USER_COLUMNS: &str =
    "id, email, name, avatar, email_verified, provider, provider_id, created_at, updated_at";

pub async fn get_user(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
    let row = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn find_user_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserRecord>, StoreError> {
    let row = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn create_user(pool: &PgPool, auth: &AuthUser) -> Result<UserRecord, StoreError> {
    let row = sqlx::query_as::<_, UserRecord>(&format!(
        "INSERT INTO users (id, email, name, avatar, email_verified, provider, provider_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(auth.id)
    .bind(&auth.email)
    .bind(auth.display_name())
    .bind(&auth.avatar)
    .bind(auth.email_verified)
    .bind(auth.provider())
    .bind(auth.provider_id.clone().unwrap_or_else(|| auth.id.to_string()))
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Rebind an existing row (matched by email) to the auth provider's id.
pub async fn update_user_by_email(pool: &PgPool, auth: &AuthUser) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE users SET \
             id = $2, name = $3, avatar = $4, email_verified = $5, provider = $6, \
             provider_id = $7, updated_at = now() \
         WHERE email = $1",
    )
    .bind(&auth.email)
    .bind(auth.id)
    .bind(auth.display_name())
    .bind(&auth.avatar)
    .bind(auth.email_verified)
    .bind(auth.provider())
    .bind(auth.provider_id.clone().unwrap_or_else(|| auth.id.to_string()))
    .execute(pool)
    .await?;
    Ok(())
}

/// Best-effort sync of the auth record into the local users table, raced
/// against a fixed timeout. Callers log failures and continue; nothing
/// here may block the primary operation.
pub async fn ensure_user(pool: &PgPool, auth: &AuthUser) -> Result<SyncOutcome, SyncError> {
    match tokio::time::timeout(SYNC_TIMEOUT, sync_user(pool, auth)).await {
        Ok(result) => result,
        Err(_) => Err(SyncError::Timeout),
    }
}

async fn sync_user(pool: &PgPool, auth: &AuthUser) -> Result<SyncOutcome, SyncError> {
    if get_user(pool, auth.id).await?.is_some() {
        return Ok(SyncOutcome::AlreadyPresent);
    }

    if find_user_by_email(pool, &auth.email).await?.is_some() {
        update_user_by_email(pool, auth).await?;
        return Ok(SyncOutcome::Updated);
    }

    match create_user(pool, auth).await {
        Ok(_) => Ok(SyncOutcome::Created),
        // Another request created the row between the check and the insert;
        // resolve the race by updating the existing row.
        Err(err) if err.is_unique_violation() => {
            update_user_by_email(pool, auth)
                .await
                .map_err(SyncError::Conflict)?;
            Ok(SyncOutcome::Updated)
        }
        Err(err) => Err(err.into()),
    }
}
