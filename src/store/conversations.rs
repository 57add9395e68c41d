use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::context::ConversationTurn;

/// Stored clarification exchange; `messages` is the jsonb turn array.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ConversationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Option<Uuid>,
    pub messages: serde_json::Value,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewConversation {
    pub user_id: Uuid,
    pub event_id: Option<Uuid>,
    pub messages: Vec<ConversationTurn>,
}

const CONVERSATION_COLUMNS: &str =
    "id, user_id, event_id, messages, status, created_at, updated_at";

pub async fn append_conversation(
    pool: &PgPool,
    conversation: &NewConversation,
) -> Result<ConversationRecord, StoreError> {
    let messages = serde_json::to_value(&conversation.messages)
        .map_err(|err| StoreError::Database(sqlx::Error::Encode(Box::new(err))))?;
    let row = sqlx::query_as::<_, ConversationRecord>(&format!(
        "INSERT INTO ai_conversations (id, user_id, event_id, messages, status) \
         VALUES ($1, $2, $3, $4, 'active') \
         RETURNING {CONVERSATION_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(conversation.user_id)
    .bind(conversation.event_id)
    .bind(messages)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn list_conversations(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<ConversationRecord>, StoreError> {
    let rows = sqlx::query_as::<_, ConversationRecord>(&format!(
        "SELECT {CONVERSATION_COLUMNS} FROM ai_conversations \
         WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
