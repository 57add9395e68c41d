use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// The eight color categories the calendar understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventColor {
    Yellow,
    Orange,
    #[default]
    Blue,
    Purple,
    Green,
    Red,
    Black,
    Pink,
}

impl EventColor {
    pub const ALL: [EventColor; 8] = [
        EventColor::Yellow,
        EventColor::Orange,
        EventColor::Blue,
        EventColor::Purple,
        EventColor::Green,
        EventColor::Red,
        EventColor::Black,
        EventColor::Pink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventColor::Yellow => "yellow",
            EventColor::Orange => "orange",
            EventColor::Blue => "blue",
            EventColor::Purple => "purple",
            EventColor::Green => "green",
            EventColor::Red => "red",
            EventColor::Black => "black",
            EventColor::Pink => "pink",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let lower = value.trim().to_lowercase();
        Self::ALL.iter().copied().find(|c| c.as_str() == lower)
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            EventColor::Yellow => &[
                "energy", "joy", "warm", "happy", "fun", "party", "celebration", "birthday",
            ],
            EventColor::Orange => &[
                "creative",
                "enthusiasm",
                "excitement",
                "innovation",
                "brainstorm",
                "workshop",
                "meeting",
            ],
            EventColor::Blue => &[
                "calm",
                "patience",
                "security",
                "meeting",
                "appointment",
                "consultation",
                "therapy",
            ],
            EventColor::Purple => &[
                "ambition",
                "wisdom",
                "power",
                "leadership",
                "strategy",
                "planning",
                "executive",
            ],
            EventColor::Green => &[
                "growth", "healing", "balance", "health", "wellness", "exercise", "nature",
                "outdoor",
            ],
            EventColor::Red => &[
                "action",
                "attention",
                "determination",
                "urgent",
                "deadline",
                "important",
                "critical",
            ],
            EventColor::Black => &[
                "formality",
                "mystery",
                "sophistication",
                "formal",
                "business",
                "interview",
                "presentation",
            ],
            EventColor::Pink => &[
                "kindness",
                "sensitivity",
                "optimism",
                "romantic",
                "date",
                "love",
                "care",
                "support",
            ],
        }
    }
}

impl std::fmt::Display for EventColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword-count color suggestion for events created without one.
/// Blue when nothing matches.
pub fn suggest_color(title: &str, description: Option<&str>) -> EventColor {
    let text = format!("{} {}", title, description.unwrap_or("")).to_lowercase();

    let mut best = EventColor::Blue;
    let mut best_score = 0usize;
    for color in EventColor::ALL {
        let score = color
            .keywords()
            .iter()
            .filter(|kw| text.contains(**kw))
            .count();
        if score > best_score {
            best = color;
            best_score = score;
        }
    }
    best
}

/// One extracted calendar event, before the caller persists it.
///
/// Start and end are local ISO-8601 strings (`YYYY-MM-DDTHH:MM:SS`) with
/// no timezone suffix; the client renders them in the user's local time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub color: EventColor,
    pub confidence: u8,
    #[serde(default)]
    pub is_all_day: bool,
    pub original_input: String,
}

impl EventDraft {
    pub fn empty(original_input: &str, confidence: u8) -> Self {
        Self {
            title: None,
            start_time: None,
            end_time: None,
            description: None,
            location: None,
            color: EventColor::Blue,
            confidence,
            is_all_day: false,
            original_input: original_input.to_string(),
        }
    }

    /// Start must precede end once both are present. An end at or before
    /// the start is read as crossing midnight and rolled forward a day.
    pub fn enforce_time_order(&mut self) {
        let (Some(start), Some(end)) = (self.start_time.as_deref(), self.end_time.as_deref())
        else {
            return;
        };
        let (Ok(start), Ok(end)) = (
            NaiveDateTime::parse_from_str(start, "%Y-%m-%dT%H:%M:%S"),
            NaiveDateTime::parse_from_str(end, "%Y-%m-%dT%H:%M:%S"),
        ) else {
            return;
        };
        if end <= start {
            let rolled = end + Duration::days(1);
            self.end_time = Some(rolled.format("%Y-%m-%dT%H:%M:%S").to_string());
        }
    }
}

pub fn clamp_confidence(value: Option<i64>, default: u8) -> u8 {
    match value {
        Some(v) => v.clamp(0, 100) as u8,
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_round_trips_through_serde() {
        let json = serde_json::to_string(&EventColor::Pink).unwrap();
        assert_eq!(json, "\"pink\"");
        let back: EventColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EventColor::Pink);
    }

    #[test]
    fn unknown_color_names_do_not_parse() {
        assert_eq!(EventColor::parse("Green"), Some(EventColor::Green));
        assert_eq!(EventColor::parse("chartreuse"), None);
    }

    #[test]
    fn suggests_color_by_keyword_count() {
        assert_eq!(suggest_color("morning gym exercise", None), EventColor::Green);
        assert_eq!(
            suggest_color("urgent deadline", Some("important release")),
            EventColor::Red
        );
    }

    #[test]
    fn suggests_blue_when_nothing_matches() {
        assert_eq!(suggest_color("xyzzy", None), EventColor::Blue);
    }

    #[test]
    fn end_at_or_before_start_rolls_to_next_day() {
        let mut draft = EventDraft::empty("late dinner", 80);
        draft.start_time = Some("2024-03-01T23:00:00".to_string());
        draft.end_time = Some("2024-03-01T01:00:00".to_string());
        draft.enforce_time_order();
        assert_eq!(draft.end_time.as_deref(), Some("2024-03-02T01:00:00"));
    }

    #[test]
    fn ordered_times_are_left_alone() {
        let mut draft = EventDraft::empty("lunch", 80);
        draft.start_time = Some("2024-03-01T12:00:00".to_string());
        draft.end_time = Some("2024-03-01T13:00:00".to_string());
        draft.enforce_time_order();
        assert_eq!(draft.end_time.as_deref(), Some("2024-03-01T13:00:00"));
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(clamp_confidence(Some(250), 80), 100);
        assert_eq!(clamp_confidence(Some(-5), 80), 0);
        assert_eq!(clamp_confidence(None, 80), 80);
    }
}
