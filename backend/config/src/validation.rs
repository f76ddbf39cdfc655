//! Config validation with user-friendly error messages.

use crate::schema::FolioConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// All errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError { path: path.into(), message: message.into() });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError { path: path.into(), message: message.into() });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &FolioConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_engine(config, &mut report);
    validate_chat(config, &mut report);
    validate_mode(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_engine(config: &FolioConfig, report: &mut ValidationReport) {
    let engine = &config.engine;
    if engine.model_name.trim().is_empty() {
        report.error("engine.modelName", "Model name cannot be empty");
    }
    if engine.max_tokens == 0 {
        report.error("engine.maxTokens", "maxTokens must be > 0");
    }
    if engine.timeout_ms == 0 {
        report.error("engine.timeoutMs", "timeoutMs must be > 0");
    } else if engine.timeout_ms <= engine.load_delay_ms {
        report.warn(
            "engine.timeoutMs",
            format!(
                "timeoutMs ({}) is not longer than loadDelayMs ({}); the local engine will always time out",
                engine.timeout_ms, engine.load_delay_ms
            ),
        );
    }
    if engine.max_history == 0 {
        report.warn("engine.maxHistory", "maxHistory is 0; it is advisory and has no effect");
    }
}

fn validate_chat(config: &FolioConfig, report: &mut ValidationReport) {
    let chat = &config.chat;
    if chat.history_window == 0 {
        report.error("chat.historyWindow", "historyWindow must be >= 1");
    }
    if chat.resume_path.trim().is_empty() {
        report.error("chat.resumePath", "resumePath cannot be empty");
    }
    if chat.min_send_interval_ms == 0 {
        report.warn("chat.minSendIntervalMs", "Rate limiting is disabled");
    }
}

fn validate_mode(config: &FolioConfig, report: &mut ValidationReport) {
    if config.mode.force_local && config.mode.disable_local {
        report.warn("mode", "Both forceLocal and disableLocal are set; disableLocal wins");
    }
}

fn validate_logging(config: &FolioConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(dir) = &logging.dir {
        if dir.trim().is_empty() {
            report.error("logging.dir", "Log directory cannot be empty; omit it for console only");
        }
    }
}
