use std::sync::Arc;

use serde::Deserialize;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::handlers::error_body;
use crate::models::context::ParseContext;
use crate::service::extraction::ExtractionService;

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    #[serde(default)]
    pub input: String,
    pub context: ParseContext,
}

/// POST /api/calendar-ai
pub fn route(
    service: Arc<ExtractionService>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "calendar-ai")
        .and(warp::post())
        .and(warp::body::json())
        .and(warp::any().map(move || service.clone()))
        .then(parse_event)
}

async fn parse_event(
    request: ParseRequest,
    service: Arc<ExtractionService>,
) -> warp::reply::WithStatus<warp::reply::Json> {
    if request.input.trim().is_empty() {
        return error_body("No input provided", StatusCode::BAD_REQUEST);
    }

    // Model failures are already absorbed into a zero-confidence result,
    // so this arm is always a 200.
    let result = service
        .parse_event_description(&request.input, &request.context)
        .await;
    warp::reply::with_status(warp::reply::json(&result), StatusCode::OK)
}
