use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::context::{EditingEvent, ParseContext};
use crate::models::event::{clamp_confidence, EventColor, EventDraft};
use crate::models::extraction::ExtractionResult;
use crate::service::datetime;
use crate::service::openai_service::ChatModel;
use crate::service::prompt_builder;

const DEFAULT_CONFIDENCE: u8 = 80;

/// Fields the model may return for one event. Everything is optional;
/// interpretation fills in the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelEvent {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    confidence: Option<i64>,
    #[serde(default)]
    is_all_day: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelPayload {
    #[serde(default)]
    events: Option<Vec<ModelEvent>>,
    #[serde(flatten)]
    event: ModelEvent,
    #[serde(default)]
    questions: Option<Vec<String>>,
    #[serde(default)]
    chat_message: Option<String>,
}

/// Runs the whole pipeline: prompt, completion, interpretation. Total over
/// its inputs; every internal failure degrades to a low-confidence result
/// instead of surfacing.
pub struct ExtractionService {
    model: Arc<dyn ChatModel>,
}

impl ExtractionService {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn parse_event_description(
        &self,
        input: &str,
        context: &ParseContext,
    ) -> ExtractionResult {
        let messages = prompt_builder::build_messages(input, context);
        match self.model.complete(messages).await {
            Ok(text) => interpret_response(&text, input, context),
            Err(err) => {
                warn!(error = %err, "chat completion failed, returning placeholder");
                ExtractionResult::model_failure(input)
            }
        }
    }
}

/// Parse the model text and normalize it into an ExtractionResult.
pub fn interpret_response(text: &str, input: &str, context: &ParseContext) -> ExtractionResult {
    let mut payload: ModelPayload = match serde_json::from_str(text) {
        Ok(parsed) => parsed,
        Err(err) => {
            debug!(error = %err, "model response was not valid JSON");
            return ExtractionResult::unparsed(input);
        }
    };

    // Move the array out first; the payload is still needed for its
    // top-level confidence, questions and chat message.
    match payload.events.take() {
        Some(events) if !events.is_empty() => split_events(events, &payload, input, context),
        _ => single_event(payload, input, context),
    }
}

fn split_events(
    events: Vec<ModelEvent>,
    payload: &ModelPayload,
    input: &str,
    context: &ParseContext,
) -> ExtractionResult {
    let payload_confidence = clamp_confidence(payload.event.confidence, DEFAULT_CONFIDENCE);
    let drafts: Vec<EventDraft> = events
        .into_iter()
        .map(|event| {
            let mut draft = EventDraft {
                start_time: normalized(
                    event.start_date.as_deref(),
                    event.start_time.as_deref(),
                    &context.timezone,
                ),
                end_time: normalized(
                    event.start_date.as_deref(),
                    event.end_time.as_deref(),
                    &context.timezone,
                ),
                title: event.title,
                description: event.description,
                location: event.location,
                color: resolve_color(event.color.as_deref(), None),
                confidence: event
                    .confidence
                    .map(|c| clamp_confidence(Some(c), DEFAULT_CONFIDENCE))
                    .unwrap_or(payload_confidence),
                is_all_day: event.is_all_day.unwrap_or(false),
                original_input: input.to_string(),
            };
            draft.enforce_time_order();
            draft
        })
        .collect();

    let chat_response = payload
        .chat_message
        .clone()
        .unwrap_or_else(|| format!("I've scheduled {} events for you.", drafts.len()));
    ExtractionResult::multiple(
        drafts,
        payload_confidence,
        payload.questions.clone().unwrap_or_default(),
        chat_response,
        input,
    )
}

fn single_event(payload: ModelPayload, input: &str, context: &ParseContext) -> ExtractionResult {
    let ModelPayload {
        event,
        questions,
        chat_message,
        ..
    } = payload;

    let start_time = normalized(
        event.start_date.as_deref(),
        event.start_time.as_deref(),
        &context.timezone,
    );
    let end_time = normalized(
        event.start_date.as_deref(),
        event.end_time.as_deref(),
        &context.timezone,
    );

    let mut draft = match context.editing_event() {
        Some(original) => reconcile(&event, start_time, end_time, original, input),
        None => EventDraft {
            title: event.title,
            start_time,
            end_time,
            description: event.description,
            location: event.location,
            color: resolve_color(event.color.as_deref(), None),
            confidence: clamp_confidence(event.confidence, DEFAULT_CONFIDENCE),
            is_all_day: event.is_all_day.unwrap_or(false),
            original_input: input.to_string(),
        },
    };
    draft.enforce_time_order();

    let chat_response = chat_message.unwrap_or_else(|| {
        let verb = if context.editing_event().is_some() {
            "updated"
        } else {
            "scheduled"
        };
        let title = draft.title.as_deref().unwrap_or("your event");
        match draft.start_time.as_deref() {
            Some(start) => format!("I've {verb} \"{title}\" for {start}"),
            None => format!("I've {verb} \"{title}\""),
        }
    });
    ExtractionResult::single(draft, questions.unwrap_or_default(), chat_response)
}

/// Per-field merge against the event being edited. Title and times fall
/// back unless the model supplied a non-empty value; location and
/// description fall back only when the model omitted the field entirely,
/// so an explicit empty string can clear them.
fn reconcile(
    event: &ModelEvent,
    start_time: Option<String>,
    end_time: Option<String>,
    original: &EditingEvent,
    input: &str,
) -> EventDraft {
    let title = event
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| original.title.clone());
    let start_time = start_time.unwrap_or_else(|| original.start_time.clone());
    let end_time = end_time.unwrap_or_else(|| original.end_time.clone());
    let location = match &event.location {
        Some(location) => Some(location.clone()),
        None => original.location.clone(),
    };
    let description = match &event.description {
        Some(description) => Some(description.clone()),
        None => original.description.clone(),
    };

    EventDraft {
        title: Some(title),
        start_time: Some(start_time),
        end_time: Some(end_time),
        description,
        location,
        color: resolve_color(event.color.as_deref(), original.color.as_deref()),
        confidence: clamp_confidence(event.confidence, DEFAULT_CONFIDENCE),
        is_all_day: event.is_all_day.unwrap_or(false),
        original_input: input.to_string(),
    }
}

/// Model color wins, then the fallback, then blue. Names outside the
/// palette degrade to blue rather than failing the event.
fn resolve_color(model: Option<&str>, fallback: Option<&str>) -> EventColor {
    model
        .and_then(EventColor::parse)
        .or_else(|| fallback.and_then(EventColor::parse))
        .unwrap_or_default()
}

/// Both halves present: combine through the normalizer, recovering a
/// malformed time as midnight of the date. A malformed date leaves the
/// field unset.
fn normalized(date: Option<&str>, time: Option<&str>, timezone: &str) -> Option<String> {
    let date = date?;
    let time = time?;
    match datetime::local_datetime(date, time, timezone) {
        Ok(stamp) => Some(stamp),
        Err(crate::error::ExtractError::TimeFormat(_)) => datetime::date_floor(date).ok(),
        Err(_) => None,
    }
}
