use std::sync::Arc;

use async_trait::async_trait;

use calendarBot::clients::openai_client::ChatMessage;
use calendarBot::error::ModelError;
use calendarBot::models::context::{EditingEvent, ParseContext, WorkingHours};
use calendarBot::models::event::EventColor;
use calendarBot::models::extraction::ExtractionResult;
use calendarBot::service::extraction::ExtractionService;
use calendarBot::service::openai_service::ChatModel;

struct FakeModel {
    body: Option<String>,
}

impl FakeModel {
    fn returning(body: &str) -> Arc<Self> {
        Arc::new(Self {
            body: Some(body.to_string()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { body: None })
    }
}

#[async_trait]
impl ChatModel for FakeModel {
    async fn complete(&self, _messages: Vec<ChatMessage>) -> Result<String, ModelError> {
        match &self.body {
            Some(body) => Ok(body.clone()),
            None => Err(ModelError::Network("connection refused".to_string())),
        }
    }
}

fn context() -> ParseContext {
    ParseContext {
        current_date: "2024-03-01T08:00:00Z".to_string(),
        timezone: "UTC".to_string(),
        working_hours: WorkingHours {
            start: "09:00".to_string(),
            end: "17:00".to_string(),
        },
        conversation: vec![],
        event_data: None,
        previous_events: vec![],
        is_follow_up: false,
        is_editing: false,
        editing_event: None,
    }
}

fn editing_context() -> ParseContext {
    let mut ctx = context();
    ctx.is_editing = true;
    ctx.editing_event = Some(EditingEvent {
        title: "Standup".to_string(),
        start_time: "2024-03-04T09:00:00".to_string(),
        end_time: "2024-03-04T09:15:00".to_string(),
        location: Some("Room A".to_string()),
        description: None,
        color: Some("orange".to_string()),
    });
    ctx
}

#[tokio::test]
async fn single_event_is_normalized_with_defaults() {
    let model = FakeModel::returning(
        r#"{"title":"Lunch with Sam","startDate":"2024-03-02","startTime":"12:00 PM","endTime":"1:00 PM"}"#,
    );
    let service = ExtractionService::new(model);

    let result = service
        .parse_event_description("lunch with Sam tomorrow at noon", &context())
        .await;

    let ExtractionResult::Single(single) = result else {
        panic!("expected single result");
    };
    assert_eq!(single.event.title.as_deref(), Some("Lunch with Sam"));
    assert_eq!(single.event.start_time.as_deref(), Some("2024-03-02T12:00:00"));
    assert_eq!(single.event.end_time.as_deref(), Some("2024-03-02T13:00:00"));
    assert_eq!(single.event.confidence, 80);
    assert_eq!(single.event.color, EventColor::Blue);
    assert_eq!(single.event.original_input, "lunch with Sam tomorrow at noon");
    assert!(!single.is_multiple_events);
    assert!(single.chat_response.contains("Lunch with Sam"));
}

#[tokio::test]
async fn multiple_events_split_and_inherit_confidence() {
    let model = FakeModel::returning(
        r#"{
            "events": [
                {"title":"Gym","startDate":"2024-03-02","startTime":"7:00 AM","endTime":"8:00 AM","confidence":95},
                {"title":"Dentist","startDate":"2024-03-02","startTime":"10:00 AM","endTime":"10:30 AM"}
            ],
            "confidence": 70
        }"#,
    );
    let service = ExtractionService::new(model);

    let result = service
        .parse_event_description("gym then dentist tomorrow", &context())
        .await;

    let ExtractionResult::Multiple(multi) = result else {
        panic!("expected multi result");
    };
    assert!(multi.is_multiple_events);
    assert_eq!(multi.events.len(), 2);
    assert_eq!(multi.confidence, 70);
    assert_eq!(multi.events[0].confidence, 95);
    assert_eq!(multi.events[1].confidence, 70);
    assert_eq!(multi.events[0].start_time.as_deref(), Some("2024-03-02T07:00:00"));
    assert_eq!(multi.events[1].start_time.as_deref(), Some("2024-03-02T10:00:00"));
    assert_eq!(multi.original_input, "gym then dentist tomorrow");
}

#[tokio::test]
async fn invalid_model_json_yields_low_confidence_question() {
    let model = FakeModel::returning("Sure! Here's your event: lunch at noon");
    let service = ExtractionService::new(model);

    let input = "lunch at noon??";
    let result = service.parse_event_description(input, &context()).await;

    assert_eq!(result.confidence(), 20);
    assert_eq!(result.questions().len(), 1);
    assert!(result.questions()[0].contains(input));
}

#[tokio::test]
async fn model_failure_becomes_zero_confidence_apology() {
    let service = ExtractionService::new(FakeModel::failing());

    let result = service
        .parse_event_description("team sync friday", &context())
        .await;

    let ExtractionResult::Single(single) = result else {
        panic!("expected single result");
    };
    assert_eq!(single.event.confidence, 0);
    assert!(single.event.title.is_none());
    assert_eq!(single.event.original_input, "team sync friday");
    assert!(!single.questions.is_empty());
}

#[tokio::test]
async fn editing_keeps_original_fields_the_model_omits() {
    let model = FakeModel::returning(
        r#"{"startDate":"2024-03-04","startTime":"10:00","endTime":"10:15"}"#,
    );
    let service = ExtractionService::new(model);

    let result = service
        .parse_event_description("move standup to 10", &editing_context())
        .await;

    let ExtractionResult::Single(single) = result else {
        panic!("expected single result");
    };
    assert_eq!(single.event.title.as_deref(), Some("Standup"));
    assert_eq!(single.event.start_time.as_deref(), Some("2024-03-04T10:00:00"));
    assert_eq!(single.event.end_time.as_deref(), Some("2024-03-04T10:15:00"));
    assert_eq!(single.event.location.as_deref(), Some("Room A"));
    assert_eq!(single.event.color, EventColor::Orange);
}

#[tokio::test]
async fn editing_takes_model_fields_and_keeps_the_rest() {
    let model = FakeModel::returning(r#"{"title":"Standup (moved)"}"#);
    let service = ExtractionService::new(model);

    let result = service
        .parse_event_description("rename the standup", &editing_context())
        .await;

    let ExtractionResult::Single(single) = result else {
        panic!("expected single result");
    };
    assert_eq!(single.event.title.as_deref(), Some("Standup (moved)"));
    assert_eq!(single.event.location.as_deref(), Some("Room A"));
    assert_eq!(single.event.start_time.as_deref(), Some("2024-03-04T09:00:00"));
}

#[tokio::test]
async fn editing_lets_an_explicit_empty_location_clear_it() {
    let model = FakeModel::returning(r#"{"location":""}"#);
    let service = ExtractionService::new(model);

    let result = service
        .parse_event_description("remove the room", &editing_context())
        .await;

    let ExtractionResult::Single(single) = result else {
        panic!("expected single result");
    };
    assert_eq!(single.event.location.as_deref(), Some(""));
    assert_eq!(single.event.title.as_deref(), Some("Standup"));
}

#[tokio::test]
async fn cross_midnight_event_rolls_end_forward() {
    let model = FakeModel::returning(
        r#"{"title":"Night shift","startDate":"2024-03-02","startTime":"11:00 PM","endTime":"3:00 AM"}"#,
    );
    let service = ExtractionService::new(model);

    let result = service
        .parse_event_description("night shift 11pm to 3am", &context())
        .await;

    let ExtractionResult::Single(single) = result else {
        panic!("expected single result");
    };
    assert_eq!(single.event.start_time.as_deref(), Some("2024-03-02T23:00:00"));
    assert_eq!(single.event.end_time.as_deref(), Some("2024-03-03T03:00:00"));
}
