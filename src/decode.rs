//! Record decoding: one raw text record into one [`DisplayItem`].
//!
//! Records are JSON objects as emitted by the trace engine's serializer:
//!
//! ```text
//! { "name": "sched_switch", "time": "...", "packet_context": {..},
//!   "event_header": {..}, "event_context": {..}, "payload": {..} }
//! ```
//!
//! The event name becomes the title. The description is the compact JSON of the
//! `payload` member, or of every remaining member when there is no payload.

use crate::error::DecodeError;
use crate::list::DisplayItem;
use serde_json::Value;

const NAME_FIELD: &str = "name";
const PAYLOAD_FIELD: &str = "payload";

/// Decode one raw record.
pub fn decode(raw: &str) -> Result<DisplayItem, DecodeError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DecodeError::EmptyRecord);
    }

    let mut fields = match serde_json::from_str::<Value>(raw)? {
        Value::Object(fields) => fields,
        _ => return Err(DecodeError::NotAnObject),
    };

    let title = match fields.remove(NAME_FIELD) {
        Some(Value::String(name)) => name,
        Some(other) => {
            return Err(DecodeError::NameNotText {
                found: json_kind(&other),
            })
        }
        None => return Err(DecodeError::MissingName),
    };

    let description = match fields.remove(PAYLOAD_FIELD) {
        Some(payload) => payload.to_string(),
        None => Value::Object(fields).to_string(),
    };

    Ok(DisplayItem::new(title, description))
}

/// Shorten a record for log output.
pub fn preview(raw: &str, max_chars: usize) -> String {
    let mut chars = raw.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
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
