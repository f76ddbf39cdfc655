//! Config defaults for the optional sections.

use crate::schema::{FolioConfig, LoggingConfig};

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// File name of the persisted theme flag, relative to the config dir.
pub const DEFAULT_THEME_FILE: &str = "theme.json";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: FolioConfig) -> FolioConfig {
    let config = apply_logging_defaults(config);
    apply_profile_defaults(config)
}

fn apply_logging_defaults(mut config: FolioConfig) -> FolioConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.as_deref().map(str::trim).unwrap_or_default().is_empty() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    config
}

fn apply_profile_defaults(mut config: FolioConfig) -> FolioConfig {
    if config.profile.theme_file.is_none() {
        config.profile.theme_file = Some(DEFAULT_THEME_FILE.to_string());
    }
    config
}
