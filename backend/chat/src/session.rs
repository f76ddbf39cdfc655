//! Mutable state owned by one chat session.

use folio_core::{ChatMode, Message, MessageId};
use serde::Serialize;

use crate::throttle::SendThrottle;

pub(crate) struct SessionState {
    pub is_open: bool,
    pub messages: Vec<Message>,
    pub throttle: SendThrottle,
    pub announced_local: bool,
    pub announced_fallback: bool,
}

impl SessionState {
    pub fn new(throttle: SendThrottle) -> Self {
        Self {
            is_open: false,
            messages: Vec::new(),
            throttle,
            announced_local: false,
            announced_fallback: false,
        }
    }

    pub fn find_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    pub fn remove(&mut self, id: MessageId) -> Option<Message> {
        let index = self.messages.iter().position(|m| m.id == id)?;
        Some(self.messages.remove(index))
    }

    /// The last `window` messages an engine may see, oldest first.
    pub fn history(&self, window: usize) -> Vec<&Message> {
        let eligible: Vec<&Message> = self.messages.iter().filter(|m| m.is_history()).collect();
        let skip = eligible.len().saturating_sub(window);
        eligible.into_iter().skip(skip).collect()
    }
}

/// Point-in-time copy of a session for rendering or inspection.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub is_open: bool,
    pub mode: ChatMode,
    pub is_initializing: bool,
    pub messages: Vec<Message>,
}

impl SessionSnapshot {
    /// Messages that are neither system notices nor pending placeholders.
    pub fn conversation(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_history())
    }

    pub fn system_notices(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_system)
    }
}
