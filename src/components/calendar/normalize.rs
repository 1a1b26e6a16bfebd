use super::models::{Attendee, AvSupport, EventRecord, DEFAULT_TITLE};
use super::time::read_date_field;
use crate::error::{Error, MailcalResult};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Keys of the four AV-support annotations, trailing colon included
pub const AV_REQUEST_LOCATION_KEY: &str = "AV Support request location:";
pub const AV_REQUIREMENTS_KEY: &str = "AV Support requirements:";
pub const AV_BRIEF_DESCRIPTION_KEY: &str = "AV Support brief description:";
pub const AV_OTHER_NOTES_KEY: &str = "AV Support other notes:";

/// Turn the extraction output into event records.
///
/// Fails with [`Error::ExtractionParse`] when the text holds no JSON array;
/// the caller drops the whole batch in that case. Individual elements are
/// never rejected.
pub fn normalize(raw: &str) -> MailcalResult<Vec<EventRecord>> {
    let items = match parse_json_array(raw)? {
        Value::Array(items) => items,
        other => {
            return Err(Error::ExtractionParse(format!(
                "expected an array, got {}",
                json_kind(&other)
            )))
        }
    };

    let records: Vec<EventRecord> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| normalize_item(idx, item))
        .collect();

    debug!("Normalized {} event records", records.len());
    Ok(records)
}

/// Parse the whole text, falling back to the outermost `[...]` slice
fn parse_json_array(raw: &str) -> MailcalResult<Value> {
    let first_err = match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if let (Some(json_start), Some(json_end)) = (raw.find('['), raw.rfind(']')) {
        if json_start < json_end {
            if let Ok(value) = serde_json::from_str::<Value>(&raw[json_start..=json_end]) {
                debug!("Recovered JSON array embedded in extraction output");
                return Ok(value);
            }
        }
    }

    Err(Error::ExtractionParse(first_err.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn normalize_item(idx: usize, item: &Value) -> EventRecord {
    let Some(obj) = item.as_object() else {
        warn!(
            "Event #{} is {} instead of an object, rendering defaults",
            idx,
            json_kind(item)
        );
        return EventRecord::default();
    };

    let start = read_date_field(text_field(obj, "start").as_deref());
    let end = read_date_field(text_field(obj, "end").as_deref());
    if let (Some(s), Some(e)) = (start.parsed(), end.parsed()) {
        if s.wall_clock() > e.wall_clock() {
            warn!("Event #{} ends before it starts, rendering as given", idx);
        }
    }

    EventRecord {
        title: text_field(obj, "title")
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        start,
        end,
        location: text_field(obj, "location"),
        description: text_field(obj, "description"),
        av: AvSupport {
            request_location: text_field(obj, AV_REQUEST_LOCATION_KEY),
            requirements: text_field(obj, AV_REQUIREMENTS_KEY),
            brief_description: text_field(obj, AV_BRIEF_DESCRIPTION_KEY),
            other_notes: text_field(obj, AV_OTHER_NOTES_KEY),
        },
        attendees: obj
            .get("attendees")
            .and_then(|a| a.as_array())
            .map(|list| list.iter().filter_map(read_attendee).collect()),
    }
}

/// Lenient text lookup: strings as-is, numbers and bools stringified, null as absent
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match obj.get(key)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    Some(clean_text(&text))
}

fn clean_text(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

fn read_attendee(value: &Value) -> Option<Attendee> {
    let obj = value.as_object()?;
    let email = text_field(obj, "email").unwrap_or_default();
    let name = text_field(obj, "name")
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.clone());
    let attendee = Attendee { name, email };

    if !attendee.is_addressable() {
        warn!("Skipping attendee without a usable email: {}", value);
        return None;
    }
    Some(attendee)
}
