use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::error::StoreError;
use crate::handlers::error_body;
use crate::store::conversations::{self, NewConversation};
use crate::store::events::{self, EventPatch, NewEvent};
use crate::store::preferences::{self, PreferencesPatch};
use crate::store::users::{self, AuthUser};

type JsonReply = warp::reply::WithStatus<warp::reply::Json>;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub user_id: Uuid,
    #[serde(default)]
    pub start: Option<NaiveDateTime>,
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct ConversationsQuery {
    pub user_id: Uuid,
}

pub fn routes(
    pool: PgPool,
    default_timezone: String,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list_events = warp::path!("api" / "events")
        .and(warp::get())
        .and(warp::query::<EventsQuery>())
        .and(with_pool(pool.clone()))
        .then(list_events);
    let create_event = warp::path!("api" / "events")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_pool(pool.clone()))
        .then(create_event);
    let get_event = warp::path!("api" / "events" / Uuid)
        .and(warp::get())
        .and(with_pool(pool.clone()))
        .then(get_event);
    let update_event = warp::path!("api" / "events" / Uuid)
        .and(warp::patch())
        .and(warp::body::json())
        .and(with_pool(pool.clone()))
        .then(update_event);
    let delete_event = warp::path!("api" / "events" / Uuid)
        .and(warp::delete())
        .and(with_pool(pool.clone()))
        .then(delete_event);

    let get_preferences = warp::path!("api" / "preferences" / Uuid)
        .and(warp::get())
        .and(with_pool(pool.clone()))
        .and(warp::any().map(move || default_timezone.clone()))
        .then(get_preferences);
    let update_preferences = warp::path!("api" / "preferences" / Uuid)
        .and(warp::put())
        .and(warp::body::json())
        .and(with_pool(pool.clone()))
        .then(update_preferences);

    let sync_user = warp::path!("api" / "users" / "sync")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_pool(pool.clone()))
        .then(sync_user);

    let create_conversation = warp::path!("api" / "conversations")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_pool(pool.clone()))
        .then(create_conversation);
    let list_conversations = warp::path!("api" / "conversations")
        .and(warp::get())
        .and(warp::query::<ConversationsQuery>())
        .and(with_pool(pool))
        .then(list_conversations);

    list_events
        .or(create_event)
        .or(get_event)
        .or(update_event)
        .or(delete_event)
        .or(get_preferences)
        .or(update_preferences)
        .or(sync_user)
        .or(create_conversation)
        .or(list_conversations)
}

fn with_pool(
    pool: PgPool,
) -> impl Filter<Extract = (PgPool,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || pool.clone())
}

fn store_error(err: StoreError, missing: &str) -> JsonReply {
    match err {
        StoreError::NotFound => error_body(missing, StatusCode::NOT_FOUND),
        other => {
            warn!(error = %other, "database operation failed");
            error_body("Failed to process request", StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn ok_json<T: serde::Serialize>(value: &T) -> JsonReply {
    warp::reply::with_status(warp::reply::json(value), StatusCode::OK)
}

async fn list_events(query: EventsQuery, pool: PgPool) -> JsonReply {
    match events::list_events(&pool, query.user_id, query.start, query.end).await {
        Ok(rows) => ok_json(&rows),
        Err(err) => store_error(err, "Event not found"),
    }
}

async fn create_event(event: NewEvent, pool: PgPool) -> JsonReply {
    match events::create_event(&pool, &event).await {
        Ok(row) => warp::reply::with_status(warp::reply::json(&row), StatusCode::CREATED),
        Err(err) => store_error(err, "Event not found"),
    }
}

async fn get_event(id: Uuid, pool: PgPool) -> JsonReply {
    match events::get_event(&pool, id).await {
        Ok(row) => ok_json(&row),
        Err(err) => store_error(err, "Event not found"),
    }
}

async fn update_event(id: Uuid, patch: EventPatch, pool: PgPool) -> JsonReply {
    match events::update_event(&pool, id, &patch).await {
        Ok(row) => ok_json(&row),
        Err(err) => store_error(err, "Event not found"),
    }
}

async fn delete_event(id: Uuid, pool: PgPool) -> JsonReply {
    match events::delete_event(&pool, id).await {
        Ok(()) => ok_json(&json!({ "deleted": true })),
        Err(err) => store_error(err, "Event not found"),
    }
}

async fn get_preferences(user_id: Uuid, pool: PgPool, default_timezone: String) -> JsonReply {
    match preferences::get_or_create_preferences(&pool, user_id, &default_timezone).await {
        Ok(row) => ok_json(&row),
        Err(err) => store_error(err, "Preferences not found"),
    }
}

async fn update_preferences(user_id: Uuid, patch: PreferencesPatch, pool: PgPool) -> JsonReply {
    match preferences::update_preferences(&pool, user_id, &patch).await {
        Ok(row) => ok_json(&row),
        Err(err) => store_error(err, "Preferences not found"),
    }
}

/// Best-effort: a failed sync is reported in the body, never as an error
/// status, so signing in keeps working when the local table is behind.
async fn sync_user(auth: AuthUser, pool: PgPool) -> JsonReply {
    match users::ensure_user(&pool, &auth).await {
        Ok(outcome) => ok_json(&json!({ "synced": true, "outcome": outcome })),
        Err(err) => {
            warn!(user = %auth.id, error = %err, "user sync failed");
            ok_json(&json!({ "synced": false }))
        }
    }
}

async fn create_conversation(conversation: NewConversation, pool: PgPool) -> JsonReply {
    match conversations::append_conversation(&pool, &conversation).await {
        Ok(row) => warp::reply::with_status(warp::reply::json(&row), StatusCode::CREATED),
        Err(err) => store_error(err, "Conversation not found"),
    }
}

async fn list_conversations(query: ConversationsQuery, pool: PgPool) -> JsonReply {
    match conversations::list_conversations(&pool, query.user_id).await {
        Ok(rows) => ok_json(&rows),
        Err(err) => store_error(err, "Conversation not found"),
    }
}
