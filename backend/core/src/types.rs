use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FolioError;

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Bot,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Bot => write!(f, "bot"),
        }
    }
}

/// The side effect an [`Action`] performs when invoked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Scroll to a page section (`#work`, `#about`, ...).
    Jump,
    /// Trigger a file download.
    Download,
    /// Open the mail client.
    Email,
    /// Open an external link.
    Link,
    /// Change the site theme.
    Theme,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionType::Jump => "jump",
            ActionType::Download => "download",
            ActionType::Email => "email",
            ActionType::Link => "link",
            ActionType::Theme => "theme",
        };
        write!(f, "{s}")
    }
}

/// A suggested follow-up attached to a bot message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub target: String,
    pub label: String,
    /// Name to save a download under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl Action {
    pub fn new(action_type: ActionType, target: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            action_type,
            target: target.into(),
            label: label.into(),
            filename: None,
        }
    }

    pub fn jump(target: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(ActionType::Jump, target, label)
    }

    pub fn download(target: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(ActionType::Download, target, label)
    }

    /// A download saved under `filename` rather than the target's own name.
    pub fn download_as(
        target: impl Into<String>,
        label: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Self::download(target, label)
        }
    }

    pub fn email(target: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(ActionType::Email, target, label)
    }

    pub fn link(target: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(ActionType::Link, target, label)
    }

    pub fn theme(mode: ThemeMode, label: impl Into<String>) -> Self {
        Self::new(ActionType::Theme, mode.to_string(), label)
    }

    /// File name offered to the downloader: the explicit filename, else the
    /// last path segment of the target.
    pub fn suggested_filename(&self) -> &str {
        if let Some(name) = self.filename.as_deref().filter(|n| !n.trim().is_empty()) {
            return name;
        }
        self.target
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.target)
    }
}

/// Which engine currently answers chat messages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChatMode {
    Local,
    #[default]
    Fallback,
    Initializing,
}

impl ChatMode {
    /// Short text shown next to the status dot.
    pub fn label(&self) -> &'static str {
        match self {
            ChatMode::Local => "Local AI",
            ChatMode::Fallback => "Fast fallback",
            ChatMode::Initializing => "Loading...",
        }
    }

    /// Longer hover text for the status dot.
    pub fn description(&self) -> &'static str {
        match self {
            ChatMode::Local => "Using local AI model",
            ChatMode::Fallback => "Using rule-based responses",
            ChatMode::Initializing => "Initializing local model",
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatMode::Local => write!(f, "local"),
            ChatMode::Fallback => write!(f, "fallback"),
            ChatMode::Initializing => write!(f, "initializing"),
        }
    }
}

/// Site colour scheme.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeMode::Light => write!(f, "light"),
            ThemeMode::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for ThemeMode {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(FolioError::InvalidAction(format!("unknown theme `{other}`"))),
        }
    }
}

/// Default model identifier reported by the local engine.
pub const DEFAULT_MODEL_NAME: &str = "Llama-3.2-1B-Instruct-q4f16_1";

/// Configuration for the local engine and the arbiter that loads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub model_name: String,
    /// Declared generation budget; the scripted engine does not enforce it.
    pub max_tokens: u32,
    /// Context window a real model would receive. The controller's own
    /// history window is applied first and wins.
    pub max_history: usize,
    /// Enforced by the arbiter around initialization.
    pub timeout_ms: u64,
    /// Simulated model download/compile time.
    pub load_delay_ms: u64,
    /// Pause before the first token of each reply.
    pub think_delay_ms: u64,
    /// Pause before each streamed token.
    pub token_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            max_tokens: 256,
            max_history: 5,
            timeout_ms: 15_000,
            load_delay_ms: 1_000,
            think_delay_ms: 500,
            token_delay_ms: 50,
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_delay_ms)
    }

    pub fn token_delay(&self) -> Duration {
        Duration::from_millis(self.token_delay_ms)
    }
}

/// Identity of a loaded engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub max_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serializes_type_field() {
        let action = Action::jump("#work", "View Work Section");
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "jump");
        assert_eq!(json["target"], "#work");
    }

    #[test]
    fn test_suggested_filename_uses_last_segment() {
        let action = Action::download("assets/resume.pdf", "Download Resume");
        assert_eq!(action.suggested_filename(), "resume.pdf");
        let bare = Action::download("resume.pdf", "Download Resume");
        assert_eq!(bare.suggested_filename(), "resume.pdf");
    }

    #[test]
    fn test_explicit_download_filename_wins() {
        let action = Action::download_as("assets/resume.pdf", "Download Resume", "Lukas_Nilsson_Resume.pdf");
        assert_eq!(action.suggested_filename(), "Lukas_Nilsson_Resume.pdf");
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["filename"], "Lukas_Nilsson_Resume.pdf");
        assert!(serde_json::to_value(Action::jump("#work", "Work")).unwrap().get("filename").is_none());
    }

    #[test]
    fn test_theme_mode_parse_and_toggle() {
        assert_eq!("Dark".parse::<ThemeMode>().unwrap(), ThemeMode::Dark);
        assert_eq!(" light ".parse::<ThemeMode>().unwrap(), ThemeMode::Light);
        assert!("sepia".parse::<ThemeMode>().is_err());
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.max_history, 5);
        assert_eq!(config.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_engine_config_partial_deserialize() {
        let config: EngineConfig = serde_json::from_str(r#"{"timeoutMs": 500}"#).unwrap();
        assert_eq!(config.timeout_ms, 500);
        assert_eq!(config.max_tokens, 256);
    }
}
