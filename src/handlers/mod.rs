pub mod calendar_ai;
pub mod rest_api;

use std::convert::Infallible;
use std::sync::Arc;

use serde_json::json;
use sqlx::PgPool;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::service::extraction::ExtractionService;

/// The full API surface, with rejection recovery applied at the top so
/// every error leaves as a JSON body.
pub fn routes(
    service: Arc<ExtractionService>,
    pool: PgPool,
    default_timezone: String,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    calendar_ai::route(service)
        .or(rest_api::routes(pool, default_timezone))
        .recover(handle_rejection)
}

pub(crate) fn error_body(
    message: &str,
    status: StatusCode,
) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(&json!({ "error": message })), status)
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    if err.is_not_found() {
        return Ok(error_body("Not found", StatusCode::NOT_FOUND));
    }
    if let Some(deserialize) = err.find::<warp::filters::body::BodyDeserializeError>() {
        return Ok(error_body(&deserialize.to_string(), StatusCode::BAD_REQUEST));
    }
    if err.find::<warp::reject::InvalidQuery>().is_some() {
        return Ok(error_body("Invalid query parameters", StatusCode::BAD_REQUEST));
    }
    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_body("Method not allowed", StatusCode::METHOD_NOT_ALLOWED));
    }
    tracing::error!(?err, "unhandled rejection");
    Ok(error_body(
        "Failed to process request",
        StatusCode::INTERNAL_SERVER_ERROR,
    ))
}
