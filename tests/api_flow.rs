use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use calendarBot::clients::openai_client::ChatMessage;
use calendarBot::error::ModelError;
use calendarBot::handlers::calendar_ai;
use calendarBot::service::extraction::ExtractionService;
use calendarBot::service::openai_service::ChatModel;

struct FakeModel {
    body: Option<String>,
}

#[async_trait]
impl ChatModel for FakeModel {
    async fn complete(&self, _messages: Vec<ChatMessage>) -> Result<String, ModelError> {
        match &self.body {
            Some(body) => Ok(body.clone()),
            None => Err(ModelError::RateLimit(60)),
        }
    }
}

fn service(body: Option<&str>) -> Arc<ExtractionService> {
    let model: Arc<dyn ChatModel> = Arc::new(FakeModel {
        body: body.map(str::to_string),
    });
    Arc::new(ExtractionService::new(model))
}

fn request_body(input: &str) -> Value {
    json!({
        "input": input,
        "context": {
            "currentDate": "2024-03-01T08:00:00Z",
            "timezone": "UTC",
            "workingHours": { "start": "09:00", "end": "17:00" }
        }
    })
}

#[tokio::test]
async fn empty_input_is_rejected() {
    let route = calendar_ai::route(service(Some("{}")));

    let response = warp::test::request()
        .method("POST")
        .path("/api/calendar-ai")
        .json(&request_body("   "))
        .reply(&route)
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["error"], "No input provided");
}

#[tokio::test]
async fn well_formed_model_output_comes_back_normalized() {
    let route = calendar_ai::route(service(Some(
        r#"{"title":"Lunch","startDate":"2024-03-02","startTime":"12:00 PM","confidence":90}"#,
    )));

    let response = warp::test::request()
        .method("POST")
        .path("/api/calendar-ai")
        .json(&request_body("lunch tomorrow at noon"))
        .reply(&route)
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["title"], "Lunch");
    assert_eq!(body["startTime"], "2024-03-02T12:00:00");
    assert_eq!(body["confidence"], 90);
    assert_eq!(body["isMultipleEvents"], false);
}

#[tokio::test]
async fn unparseable_model_output_is_a_success_with_questions() {
    let route = calendar_ai::route(service(Some("not json at all")));

    let response = warp::test::request()
        .method("POST")
        .path("/api/calendar-ai")
        .json(&request_body("lunch tomorrow"))
        .reply(&route)
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["confidence"], 20);
    assert!(body["questions"].as_array().is_some_and(|q| !q.is_empty()));
}

#[tokio::test]
async fn provider_failure_is_absorbed_into_the_response() {
    let route = calendar_ai::route(service(None));

    let response = warp::test::request()
        .method("POST")
        .path("/api/calendar-ai")
        .json(&request_body("lunch tomorrow"))
        .reply(&route)
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["confidence"], 0);
}

#[tokio::test]
async fn multi_event_payload_reports_every_event() {
    let route = calendar_ai::route(service(Some(
        r#"{"events":[
            {"title":"Gym","startDate":"2024-03-02","startTime":"7:00 AM"},
            {"title":"Dentist","startDate":"2024-03-02","startTime":"10:00 AM"}
        ],"confidence":85}"#,
    )));

    let response = warp::test::request()
        .method("POST")
        .path("/api/calendar-ai")
        .json(&request_body("gym then dentist tomorrow"))
        .reply(&route)
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["isMultipleEvents"], true);
    assert_eq!(body["events"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["confidence"], 85);
}
