//! Accessors for the loosely typed source payloads.

use indexmap::IndexMap;
use serde_json::Value;

pub fn str_field<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str)
}

/// Non-empty, trimmed string field.
pub fn text_field(payload: &Value, key: &str) -> Option<String> {
    str_field(payload, key)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn bool_field(payload: &Value, key: &str) -> Option<bool> {
    match payload.get(key)? {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Unsigned integer given either as a JSON number or as a numeric string.
pub fn u64_field(payload: &Value, key: &str) -> Option<u64> {
    payload.get(key).and_then(as_u64)
}

pub fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Text of an expression-like field: either a bare string or `{"value": "...", "type": ...}`.
pub fn expression_text(value: &Value) -> Option<&str> {
    match value {
        Value::String(text) => Some(text),
        Value::Object(map) => map.get("value").and_then(Value::as_str),
        _ => None,
    }
}

/// Secret given inline either as a string or as `{"type": "SecureString", "value": "..."}`.
pub fn secure_string(payload: &Value, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(expression_text)
        .map(str::to_string)
        .filter(|value| !value.is_empty())
}

/// Render a scalar for a target field that only accepts strings.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Object field rendered as an ordered string map; non-object values yield an empty map.
pub fn string_map(payload: &Value, key: &str) -> IndexMap<String, String> {
    payload
        .get(key)
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(name, value)| (name.clone(), stringify(value)))
                .collect()
        })
        .unwrap_or_default()
}

/// Parse a .NET style timespan `[d.]hh:mm:ss` into seconds.
pub fn parse_timespan(text: &str) -> Option<u64> {
    let text = text.trim();
    let (days, clock) = match text.split_once('.') {
        Some((days, clock)) if clock.contains(':') => (days.parse::<u64>().ok()?, clock),
        _ => (0, text),
    };
    let parts: Vec<&str> = clock.split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return None;
    };
    let hours: u64 = hours.parse().ok()?;
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }
    Some(days * 86_400 + hours * 3_600 + minutes * 60 + seconds)
}

pub fn array_field<'a>(payload: &'a Value, key: &str) -> &'a [Value] {
    payload
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
