use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::message::{Message, MessageId};
use crate::types::ChatMode;

/// Default broadcast buffer for UI events.
const DEFAULT_BUFFER_SIZE: usize = 256;

/// Everything a rendering layer needs to keep a transcript view in sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A message was added at the end of the transcript.
    MessageAppended { message: Message },
    /// A streamed token was appended to a pending message.
    Token { id: MessageId, token: String },
    /// A pending message received its final text and actions.
    MessageCompleted { message: Message },
    /// A message (a failed placeholder) was taken out of the transcript.
    MessageRemoved { id: MessageId },
    ModeChanged { mode: ChatMode },
    VisibilityChanged { open: bool },
}

/// Fan-out of [`ChatEvent`]s to any number of UI subscribers.
///
/// Publishing never blocks and never fails; events are dropped when nobody
/// is listening.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChatEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: ChatEvent) {
        if self.tx.send(event).is_err() {
            trace!("No chat event subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
