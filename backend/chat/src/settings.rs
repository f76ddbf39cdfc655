use std::time::Duration;

use folio_engine::rules::{RESUME_FILENAME, RESUME_PATH};
use serde::{Deserialize, Serialize};

/// Per-session tuning of the chat controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatSettings {
    /// Minimum gap between two accepted sends.
    pub min_send_interval_ms: u64,
    /// Number of recent messages handed to the engine as history.
    pub history_window: usize,
    /// Delay between the greeting and the automatic engine start.
    pub auto_init_delay_ms: u64,
    pub resume_path: String,
    /// Name the resume is saved under.
    pub resume_filename: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            min_send_interval_ms: 1000,
            history_window: 10,
            auto_init_delay_ms: 1000,
            resume_path: RESUME_PATH.to_string(),
            resume_filename: RESUME_FILENAME.to_string(),
        }
    }
}

impl ChatSettings {
    pub fn min_send_interval(&self) -> Duration {
        Duration::from_millis(self.min_send_interval_ms)
    }

    pub fn auto_init_delay(&self) -> Duration {
        Duration::from_millis(self.auto_init_delay_ms)
    }
}
