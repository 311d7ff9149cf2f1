use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A source fragment that could not be translated, kept together with the reason.
///
/// Translators return this as the error arm of [`Translation`] so that `?` can carry a soft
/// failure up to the nearest point that must produce a total result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsupportedValue {
    /// Original payload fragment, untouched.
    pub value: Value,
    /// Human-readable reason.
    pub message: String,
}

/// Result of a soft translation step.
pub type Translation<T> = Result<T, UnsupportedValue>;

impl UnsupportedValue {
    pub fn new(value: Value, message: impl Into<String>) -> Self {
        Self {
            value,
            message: message.into(),
        }
    }

    /// Fold several failures into one, joining their reasons with `; `.
    ///
    /// Returns `None` when `items` is empty.
    pub fn merge(value: Value, items: Vec<UnsupportedValue>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        let message = items
            .iter()
            .map(|item| item.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Some(Self { value, message })
    }
}

impl fmt::Display for UnsupportedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
