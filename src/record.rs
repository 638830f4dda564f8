//! Log record types handed to sinks.

use serde::Serialize;
use serde_json::Value;

/// The payload of a log call.
///
/// Decided at construction rather than by runtime inspection: strings
/// become text (optionally after template expansion), structured values
/// pass through to the sink unmodified.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogMessage {
    /// A rendered text message.
    Text(String),
    /// A structured payload, forwarded without stringification.
    Structured(Value),
}

impl LogMessage {
    /// The text content, if this is a text message.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            LogMessage::Text(text) => Some(text),
            LogMessage::Structured(_) => None,
        }
    }

    /// The structured payload, if this is a structured message.
    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            LogMessage::Text(_) => None,
            LogMessage::Structured(value) => Some(value),
        }
    }
}

impl From<&str> for LogMessage {
    fn from(text: &str) -> Self {
        LogMessage::Text(text.to_string())
    }
}

impl From<String> for LogMessage {
    fn from(text: String) -> Self {
        LogMessage::Text(text)
    }
}

impl From<Value> for LogMessage {
    fn from(value: Value) -> Self {
        LogMessage::Structured(value)
    }
}

/// A single record, created fresh per log call and handed to the sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// The expanded or structured message.
    pub message: LogMessage,
    /// The ambient session id, or the literal `"undefined"`.
    pub session: String,
    /// The chain of enclosing sub-session ids, outermost first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_sessions: Option<Vec<String>>,
}
