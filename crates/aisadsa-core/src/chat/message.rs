//! Chat transcript message types.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Reply appended when a chat round trip fails for any reason.
pub const CHAT_FAILURE_TEXT: &str = "Sorry, I couldn't process your request. Please try again.";

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// A single transcript entry.
///
/// The timestamp is for display only; transcript order is append order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
    /// ISO 8601 timestamp (UTC, millisecond precision)
    pub timestamp: String,
    #[serde(default)]
    pub is_error: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User, false)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Assistant, false)
    }

    /// The fixed, error-marked assistant reply.
    pub fn failure() -> Self {
        Self::new(CHAT_FAILURE_TEXT, Sender::Assistant, true)
    }

    fn new(text: impl Into<String>, sender: Sender, is_error: bool) -> Self {
        Self {
            text: text.into(),
            sender,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            is_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let message = ChatMessage::failure();
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["sender"], "assistant");
        assert_eq!(value["isError"], true);
        assert_eq!(value["text"], CHAT_FAILURE_TEXT);
        assert!(message.timestamp.ends_with('Z'));
    }

    #[test]
    fn test_is_error_defaults_to_false() {
        let message: ChatMessage = serde_json::from_str(
            r#"{"text":"hi","sender":"user","timestamp":"2024-05-01T10:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(message.sender, Sender::User);
        assert!(!message.is_error);
    }

    #[test]
    fn test_sender_display() {
        assert_eq!(Sender::Assistant.to_string(), "assistant");
        assert_eq!("user".parse::<Sender>().unwrap(), Sender::User);
    }
}
