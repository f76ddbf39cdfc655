pub mod error;
pub mod event;
pub mod message;
pub mod traits;
pub mod types;

pub use error::FolioError;
pub use event::{ChatEvent, EventBus};
pub use message::{HistoryTurn, Message, MessageId};
pub use traits::{
    Capabilities, ChatEngine, Downloader, EngineLoader, Mailer, Navigator, Notifier,
    StatusIndicator, ThemeSetter, TokenSink,
};
pub use types::{Action, ActionType, ChatMode, EngineConfig, ModelInfo, Role, ThemeMode};
