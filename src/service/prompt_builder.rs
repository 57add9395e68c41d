use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::clients::openai_client::ChatMessage;
use crate::models::context::ParseContext;

/// Assemble the message list for one extraction call. The caller's
/// conversation history is read as-is and never modified.
pub fn build_messages(input: &str, context: &ParseContext) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(persona_prompt(context))];

    if context.is_follow_up {
        for turn in &context.conversation {
            messages.push(ChatMessage {
                role: turn.role.as_str().to_string(),
                content: turn.content.clone(),
            });
        }
        if let Some(event) = &context.event_data {
            messages.push(ChatMessage::assistant(format!(
                "Current event: {} at {}",
                event.title, event.start_time
            )));
        }
    }

    if !context.previous_events.is_empty() {
        let summary = context
            .previous_events
            .iter()
            .enumerate()
            .map(|(idx, event)| {
                format!("{}. {} on {}", idx + 1, event.title, date_part(&event.start_time))
            })
            .collect::<Vec<_>>()
            .join("\n");
        messages.push(ChatMessage::system(format!(
            "Previously created events:\n{summary}\n\n\
             When users ask for \"more\" or say \"that doesn't feel like enough\", they want \
             additional events beyond what was already created."
        )));
    }

    if let Some(editing) = context.editing_event() {
        messages.push(ChatMessage::system(format!(
            "You are editing an existing event. Here are the current details:\n\
             Title: {title}\n\
             Start Time: {start}\n\
             End Time: {end}\n\
             Location: {location}\n\n\
             The user wants to modify this event. Only update the fields they specifically \
             mention.",
            title = editing.title,
            start = editing.start_time,
            end = editing.end_time,
            location = editing.location.as_deref().unwrap_or("Not specified"),
        )));
    }

    messages.push(ChatMessage::user(input));
    messages.push(ChatMessage::system(extraction_prompt(context)));
    messages
}

fn persona_prompt(context: &ParseContext) -> String {
    let mut prompt = format!(
        "You are a helpful calendar assistant. When scheduling events:\n\
         - Suggest appropriate times based on activity type (workouts in morning/evening, \
         meetings during work hours)\n\
         - Consider what makes sense for humans (no workouts at 2am)\n\
         - If no specific time given, suggest reasonable defaults for FUTURE dates/times\n\
         - ALWAYS suggest times that are in the future, never in the past\n\
         - User is in timezone: {timezone}\n\
         - Current local time: {local_time}\n\
         - Working hours: {hours_start} - {hours_end}\n\n\
         When suggesting times, use the user's local timezone and be specific about dates.\n\
         If the user says \"tomorrow\" or relative dates, calculate the actual date.\n\
         If the user just says a time like \"7am\", assume it's for the next appropriate day \
         (today if the time hasn't passed, tomorrow if it has).\n\n\
         If the user requests multiple events (like \"schedule multiple meetings\" or \
         \"create a series of events\"), create multiple events with appropriate spacing and \
         progression.",
        timezone = context.timezone,
        local_time = local_time_display(context),
        hours_start = context.working_hours.start,
        hours_end = context.working_hours.end,
    );

    if let Some(editing) = context.editing_event() {
        prompt.push_str(&format!(
            "\n\nIMPORTANT: You are currently editing an existing event:\n\
             - Original event: \"{title}\"\n\
             - Original time: {start} to {end}\n\
             - Original location: {location}\n\n\
             The user wants to modify this event. Only change the fields they specifically \
             mention. If they don't mention a field, keep the original value.",
            title = editing.title,
            start = editing.start_time,
            end = editing.end_time,
            location = editing.location.as_deref().unwrap_or("No location specified"),
        ));
    }
    prompt
}

fn extraction_prompt(context: &ParseContext) -> String {
    let editing_note = if context.is_editing {
        "IMPORTANT: You are editing an existing event. Only include fields that the user \
         specifically wants to change. If they don't mention a field, use the original value \
         from the editing context."
    } else {
        "IMPORTANT: Make sure startDate is always in the future, never today if the time has \
         already passed."
    };

    format!(
        "Extract event details and return JSON with:\n\
         - events: array of event objects (use this for multiple events)\n\
         - title: single event title (use this for single events)\n\
         - startDate: date in YYYY-MM-DD format (ensure this is a FUTURE date)\n\
         - startTime: time in \"H:MM AM/PM\" format (suggest appropriate time if none given)\n\
         - endTime: end time in \"H:MM AM/PM\" format (estimate duration)\n\
         - description: brief description\n\
         - location: location if mentioned\n\
         - color: suggested color category (yellow, orange, blue, purple, green, red, black, \
         pink)\n\
         - confidence: 0-100 (how sure you are)\n\
         - questions: array of follow-up questions if needed\n\
         - chatMessage: natural language response explaining what you scheduled\n\n\
         Color categorization guide:\n\
         - yellow: energy, joy, warmth (parties, celebrations, fun activities)\n\
         - orange: creativity, enthusiasm, excitement (workshops, brainstorming, meetings)\n\
         - blue: calm, patience, security (appointments, consultations, therapy)\n\
         - purple: ambition, wisdom, power (leadership, strategy, executive meetings)\n\
         - green: growth, healing, balance (health, wellness, exercise, nature)\n\
         - red: action, attention, determination (urgent, deadlines, important)\n\
         - black: formality, mystery, sophistication (business, interviews, presentations)\n\
         - pink: kindness, sensitivity, optimism (romantic, dates, care, support)\n\n\
         For multiple events, return an \"events\" array where each object has: title, \
         startDate, startTime, endTime, description, location, color.\n\
         For single events, return the individual fields directly.\n\
         Output ONLY raw JSON, no prose, markdown, or code fences.\n\n\
         {editing_note}"
    )
}

/// Render "now" in the user's timezone for the prompt. Falls back to the
/// raw string when either the date or the zone fails to parse.
fn local_time_display(context: &ParseContext) -> String {
    let parsed: Result<DateTime<Utc>, _> = context.current_date.parse();
    match (parsed, context.timezone.parse::<Tz>()) {
        (Ok(now), Ok(tz)) => now
            .with_timezone(&tz)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        _ => context.current_date.clone(),
    }
}

fn date_part(datetime: &str) -> &str {
    datetime.split('T').next().unwrap_or(datetime)
}
