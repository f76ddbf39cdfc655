//! Transcript Event Logger
//!
//! Chat transcript events written through `tracing` under the `chat_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

pub const EVENT_TARGET: &str = "chat_events";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptEvent {
    Message {
        role: String,
        content: String,
    },
    Command {
        name: String,
        args: String,
    },
    ModeChange {
        mode: String,
    },
    Error {
        error_msg: String,
    },
}

impl TranscriptEvent {
    /// The same event with all free text redacted.
    pub fn redacted(mut self) -> Self {
        match &mut self {
            TranscriptEvent::Message { content, .. } => *content = redact_sensitive_data(content),
            TranscriptEvent::Command { args, .. } => *args = redact_sensitive_data(args),
            TranscriptEvent::Error { error_msg } => *error_msg = redact_sensitive_data(error_msg),
            TranscriptEvent::ModeChange { .. } => {}
        }
        self
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: TranscriptEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redacts and logs one transcript event.
    pub fn log_event(session_id: &str, event: TranscriptEvent) {
        let entry = EventLogEntry {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event: event.redacted(),
        };
        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: EVENT_TARGET, session = session_id, entry = %json, "Chat transcript event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_content_is_redacted() {
        let event = TranscriptEvent::Message {
            role: "user".into(),
            content: "reach me at someone@example.org".into(),
        }
        .redacted();
        match event {
            TranscriptEvent::Message { content, .. } => assert!(content.contains("[REDACTED_EMAIL]")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_entry_serializes_with_tag() {
        let entry = EventLogEntry {
            session_id: "s1".into(),
            timestamp: Utc::now(),
            event: TranscriptEvent::ModeChange { mode: "local".into() },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "mode_change");
        assert_eq!(json["event"]["mode"], "local");
    }
}
