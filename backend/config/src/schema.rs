//! Folio runtime configuration schema.
//!
//! Typed for serde YAML/JSON deserialization. Every section is optional in
//! the file; missing fields take their defaults.

use folio_chat::ChatSettings;
use folio_core::{EngineConfig, ThemeMode};
use folio_engine::ModeSignals;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolioConfig {
    /// Chat controller tuning
    #[serde(default)]
    pub chat: ChatSettings,

    /// Local engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Local/fallback mode signals
    #[serde(default)]
    pub mode: ModeConfig,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    /// Host-side preferences
    #[serde(default)]
    pub profile: ProfileConfig,
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModeConfig {
    pub force_local: bool,
    pub disable_local: bool,
    pub debug: bool,
    /// Skip the local engine on devices that look incapable.
    pub require_capable_device: bool,
}

impl ModeConfig {
    pub fn signals(&self) -> ModeSignals {
        ModeSignals {
            force_local: self.force_local,
            disable_local: self.disable_local,
            debug: self.debug,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "folio_chat=debug".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for daily NDJSON log files; console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileConfig {
    /// Theme used until one has been persisted.
    #[serde(default)]
    pub default_theme: ThemeMode,
    /// JSON file holding the persisted theme flag, relative to the config dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_file: Option<String>,
    /// Seed for reproducible greetings and local replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}
