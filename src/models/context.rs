use serde::{Deserialize, Serialize};

/// Everything the caller can hand the extraction pipeline alongside the
/// free-text input. Every recognized field is explicit; unknown fields in
/// the request body are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseContext {
    /// ISO datetime of "now" from the client's point of view.
    pub current_date: String,
    /// IANA timezone name, e.g. "Europe/Helsinki".
    pub timezone: String,
    pub working_hours: WorkingHours,
    #[serde(default)]
    pub conversation: Vec<ConversationTurn>,
    #[serde(default)]
    pub event_data: Option<EventSummary>,
    #[serde(default)]
    pub previous_events: Vec<EventSummary>,
    #[serde(default)]
    pub is_follow_up: bool,
    #[serde(default)]
    pub is_editing: bool,
    #[serde(default)]
    pub editing_event: Option<EditingEvent>,
}

impl ParseContext {
    pub fn editing_event(&self) -> Option<&EditingEvent> {
        if self.is_editing {
            self.editing_event.as_ref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkingHours {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of a clarification exchange. Append-only; the prompt builder
/// reads but never rewrites history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: String,
}

/// Minimal view of an already-created event, used for "schedule more like
/// this" follow-ups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub title: String,
    pub start_time: String,
}

/// Field values of the persisted event a request is editing. Lives only
/// for the duration of that request; the reconciler falls back to these
/// for every field the model leaves out.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditingEvent {
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}
