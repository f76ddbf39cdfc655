use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FolioError;
use crate::message::HistoryTurn;
use crate::types::{ChatMode, EngineConfig, ModelInfo, ThemeMode};

/// Receives streamed tokens as an engine produces them.
pub type TokenSink<'a> = &'a mut (dyn FnMut(&str) + Send);

/// A generative chat engine (the scripted local model, or a real one).
#[async_trait]
pub trait ChatEngine: Send + Sync {
    /// Engine name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Whether `chat` may be called.
    fn is_ready(&self) -> bool;

    fn config(&self) -> &EngineConfig;

    fn model_info(&self) -> ModelInfo;

    /// Generate a reply to `prompt`, streaming tokens to `on_token` if given.
    ///
    /// Returns the full reply text, which always equals the concatenation of
    /// the streamed tokens.
    async fn chat(
        &self,
        prompt: &str,
        history: &[HistoryTurn],
        on_token: Option<TokenSink<'_>>,
    ) -> Result<String, FolioError>;
}

/// Constructs a [`ChatEngine`]. The arbiter races this against its timeout.
#[async_trait]
pub trait EngineLoader: Send + Sync {
    async fn load(&self, config: &EngineConfig) -> Result<Arc<dyn ChatEngine>, FolioError>;
}

// ---------------------------------------------------------------------------
// Host capabilities
// ---------------------------------------------------------------------------

/// Page navigation.
pub trait Navigator: Send + Sync {
    /// Scroll to an in-page section such as `#work`.
    fn navigate_to(&self, target: &str);

    /// Open an external URL in a new context.
    fn open_external(&self, url: &str);
}

/// Site theme switching.
pub trait ThemeSetter: Send + Sync {
    fn set_theme(&self, mode: ThemeMode);

    fn current_theme(&self) -> ThemeMode;
}

/// File download trigger.
pub trait Downloader: Send + Sync {
    fn download(&self, url: &str, filename: &str);
}

/// Mail client hand-off.
pub trait Mailer: Send + Sync {
    fn compose(&self, address: &str);
}

/// Transient user-facing notices (toasts).
pub trait Notifier: Send + Sync {
    fn warn(&self, title: &str, body: &str);
}

/// The chat header's status dot.
pub trait StatusIndicator: Send + Sync {
    fn show_mode(&self, mode: ChatMode);
}

/// The full set of host capabilities a chat session needs.
#[derive(Clone)]
pub struct Capabilities {
    pub navigator: Arc<dyn Navigator>,
    pub theme: Arc<dyn ThemeSetter>,
    pub downloader: Arc<dyn Downloader>,
    pub mailer: Arc<dyn Mailer>,
    pub notifier: Arc<dyn Notifier>,
    pub status: Arc<dyn StatusIndicator>,
}

impl Capabilities {
    /// Use one object that implements every capability.
    pub fn from_host<H>(host: Arc<H>) -> Self
    where
        H: Navigator + ThemeSetter + Downloader + Mailer + Notifier + StatusIndicator + 'static,
    {
        Self {
            navigator: host.clone(),
            theme: host.clone(),
            downloader: host.clone(),
            mailer: host.clone(),
            notifier: host.clone(),
            status: host,
        }
    }
}
