use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Action, Role};

/// Identifier of a transcript message. UUID v7, so ids sort by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    /// Informational notices (mode changes, command acknowledgements).
    /// Never sent to an engine as history.
    pub is_system: bool,
    pub actions: Vec<Action>,
    /// Set while the message is the pending reply placeholder.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub streaming: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn build(role: Role, text: String, is_system: bool, actions: Vec<Action>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            text,
            is_system,
            actions,
            streaming: false,
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::build(Role::User, text.into(), false, Vec::new())
    }

    pub fn bot(text: impl Into<String>, actions: Vec<Action>) -> Self {
        Self::build(Role::Bot, text.into(), false, actions)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::build(Role::Bot, text.into(), true, Vec::new())
    }

    /// An empty bot message that a reply will be written into.
    pub fn placeholder() -> Self {
        let mut message = Self::build(Role::Bot, String::new(), false, Vec::new());
        message.streaming = true;
        message
    }

    /// Whether this message may be passed to an engine as conversation history.
    pub fn is_history(&self) -> bool {
        !self.is_system && !self.streaming
    }
}

/// A prior conversation turn handed to an engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryTurn {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for HistoryTurn {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let first = Message::user("one");
        let second = Message::user("two");
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_history_excludes_system_and_pending() {
        assert!(Message::user("hi").is_history());
        assert!(Message::bot("hello", vec![]).is_history());
        assert!(!Message::system("Loading...").is_history());
        assert!(!Message::placeholder().is_history());
    }

    #[test]
    fn test_streaming_flag_omitted_when_false() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert!(json.get("streaming").is_none());
        let json = serde_json::to_value(Message::placeholder()).unwrap();
        assert_eq!(json["streaming"], true);
    }

    #[test]
    fn test_history_turn_from_message() {
        let turn = HistoryTurn::from(&Message::user("what do you do?"));
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.content, "what do you do?");
    }
}
