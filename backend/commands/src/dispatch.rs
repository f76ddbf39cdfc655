/// Command dispatch: route detected commands to handlers.
use anyhow::Result;
use async_trait::async_trait;
use folio_core::{Action, ThemeMode};
use tracing::info;

use crate::types::CommandInvocation;

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// Host state a handler may read.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub current_theme: ThemeMode,
    /// Site-relative path of the downloadable resume.
    pub resume_path: String,
    pub resume_filename: String,
}

/// Acknowledgement text plus the side effect the caller should perform.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResponse {
    pub text: String,
    pub action: Option<Action>,
}

impl CommandResponse {
    pub fn reply(text: impl Into<String>) -> Self {
        Self { text: text.into(), action: None }
    }

    pub fn with_action(text: impl Into<String>, action: Action) -> Self {
        Self { text: text.into(), action: Some(action) }
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: &CommandContext, inv: &CommandInvocation) -> Result<CommandResponse>;
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

use std::collections::HashMap;
use std::sync::Arc;

pub struct CommandDispatcher {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self { handlers: HashMap::new() }
    }

    pub fn register(&mut self, key: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(key.into(), handler);
    }

    pub async fn dispatch(
        &self,
        ctx: &CommandContext,
        inv: &CommandInvocation,
    ) -> Result<CommandResponse> {
        if let Some(handler) = self.handlers.get(&inv.key) {
            info!(command = %inv.key, args = ?inv.args, "Dispatching slash command");
            handler.handle(ctx, inv).await
        } else {
            Ok(CommandResponse::reply(format!(
                "No handler registered for command /{}", inv.key
            )))
        }
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self { Self::new() }
}
