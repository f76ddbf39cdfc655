//! `folio-config`: Folio runtime configuration.
//!
//! Provides:
//! - Typed config schema (chat, engine, mode signals, logging, profile)
//! - YAML read/write under `~/.folio/`
//! - `${ENV_VAR}` substitution and `FOLIO_*` overrides
//! - Default value application
//! - Validation with errors and warnings

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::{apply_all_defaults, DEFAULT_LOG_LEVEL, DEFAULT_THEME_FILE};
pub use env::{apply_env_overrides, collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, parse_config_value, write_config};
pub use schema::{FolioConfig, LoggingConfig, ModeConfig, ProfileConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Load, substitute env vars, apply overrides and defaults, then validate.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<FolioConfig> {
    let value = load_config(path).await?;
    let env: HashMap<String, String> = std::env::vars().collect();
    prepare(value, &env)
}

/// The pure half of [`load_and_prepare`], given the raw file value and an environment.
pub fn prepare(value: serde_json::Value, env: &HashMap<String, String>) -> Result<FolioConfig> {
    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;

    let config: FolioConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_env_overrides(config, env)?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if !report.is_valid() {
        let messages: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        bail!("Invalid config: {}", messages.join("; "));
    }

    Ok(config)
}
