use serde::Serialize;

use crate::models::event::EventDraft;

pub const UNPARSED_CONFIDENCE: u8 = 20;

/// What the pipeline hands back to the caller: one draft or several,
/// always well-formed regardless of what the model produced.
/// Constructed fresh per call and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ExtractionResult {
    Multiple(MultiEventResult),
    Single(SingleEventResult),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleEventResult {
    #[serde(flatten)]
    pub event: EventDraft,
    pub questions: Vec<String>,
    pub chat_response: String,
    pub is_multiple_events: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiEventResult {
    pub events: Vec<EventDraft>,
    pub confidence: u8,
    pub questions: Vec<String>,
    pub chat_response: String,
    pub original_input: String,
    pub is_multiple_events: bool,
}

impl ExtractionResult {
    pub fn single(event: EventDraft, questions: Vec<String>, chat_response: String) -> Self {
        ExtractionResult::Single(SingleEventResult {
            event,
            questions,
            chat_response,
            is_multiple_events: false,
        })
    }

    pub fn multiple(
        events: Vec<EventDraft>,
        confidence: u8,
        questions: Vec<String>,
        chat_response: String,
        original_input: &str,
    ) -> Self {
        ExtractionResult::Multiple(MultiEventResult {
            events,
            confidence,
            questions,
            chat_response,
            original_input: original_input.to_string(),
            is_multiple_events: true,
        })
    }

    /// Placeholder for model text that was not valid JSON.
    pub fn unparsed(original_input: &str) -> Self {
        ExtractionResult::single(
            EventDraft::empty(original_input, UNPARSED_CONFIDENCE),
            vec![format!(
                "I couldn't fully understand \"{}\". Could you please provide more details \
                 about the date and time?",
                original_input
            )],
            "I'm having trouble understanding your request. Could you provide more details?"
                .to_string(),
        )
    }

    /// Placeholder for a failed round trip to the provider.
    pub fn model_failure(original_input: &str) -> Self {
        ExtractionResult::single(
            EventDraft::empty(original_input, 0),
            vec![
                "I encountered an error processing your request. Could you please try \
                 rephrasing your event description?"
                    .to_string(),
            ],
            "I'm having trouble processing your request right now. Could you please try again?"
                .to_string(),
        )
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, ExtractionResult::Multiple(_))
    }

    pub fn confidence(&self) -> u8 {
        match self {
            ExtractionResult::Multiple(multi) => multi.confidence,
            ExtractionResult::Single(single) => single.event.confidence,
        }
    }

    pub fn questions(&self) -> &[String] {
        match self {
            ExtractionResult::Multiple(multi) => &multi.questions,
            ExtractionResult::Single(single) => &single.questions,
        }
    }

    pub fn event_count(&self) -> usize {
        match self {
            ExtractionResult::Multiple(multi) => multi.events.len(),
            ExtractionResult::Single(_) => 1,
        }
    }
}
