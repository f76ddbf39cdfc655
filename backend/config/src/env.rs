//! Environment variable handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside string values, resolved at load time.
//!   Only uppercase `[A-Z_][A-Z0-9_]*` names are matched; `$${VAR}` escapes
//!   to a literal `${VAR}`.
//! - `FOLIO_*` variables that override individual fields after parsing.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::schema::{FolioConfig, LoggingConfig};

/// `$${NAME}` (escaped) or `${NAME}`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references using the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute `${VAR}` references using a provided map.
///
/// Walks the value tree; only string leaves are processed. Unset or empty
/// variables are an error.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Collect all env var names referenced in a config value tree (for diagnostics).
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    let mut vars = Vec::new();
    collect_vars_recursive(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

fn collect_vars_recursive(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            for caps in ENV_VAR_PATTERN.captures_iter(s) {
                if caps[1].is_empty() {
                    out.push(caps[2].to_string());
                }
            }
        }
        Value::Array(arr) => arr.iter().for_each(|v| collect_vars_recursive(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_vars_recursive(v, out)),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// FOLIO_* overrides
// ---------------------------------------------------------------------------

fn flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().with_context(|| format!("{key} must be a number, got `{value}`"))
}

/// Apply `FOLIO_*` environment overrides on top of the parsed file.
pub fn apply_env_overrides(mut config: FolioConfig, env: &HashMap<String, String>) -> Result<FolioConfig> {
    for (key, value) in env.iter().filter(|(k, _)| k.starts_with("FOLIO_")) {
        match key.as_str() {
            "FOLIO_NO_LOCAL" => config.mode.disable_local = flag(value),
            "FOLIO_FORCE_LOCAL" => config.mode.force_local = flag(value),
            "FOLIO_DEBUG" => config.mode.debug = flag(value),
            "FOLIO_MODEL" => config.engine.model_name = value.clone(),
            "FOLIO_TIMEOUT_MS" => config.engine.timeout_ms = number(key, value)?,
            "FOLIO_SEED" => config.profile.seed = Some(number(key, value)?),
            "FOLIO_LOG_LEVEL" => {
                config.logging.get_or_insert_with(LoggingConfig::default).level = Some(value.clone());
            }
            "FOLIO_LOG_DIR" => {
                config.logging.get_or_insert_with(LoggingConfig::default).dir = Some(value.clone());
            }
            _ => continue,
        }
        debug!(key = %key, "Applied env override");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_var() {
        let v = json!({"chat": {"resumePath": "${SITE_ROOT}/resume.pdf"}});
        let result = resolve_env_vars_with(&v, &env(&[("SITE_ROOT", "/srv")])).unwrap();
        assert_eq!(result["chat"]["resumePath"], "/srv/resume.pdf");
    }

    #[test]
    fn error_names_var_and_path() {
        let v = json!({"engine": {"modelName": "${MISSING_VAR}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("MISSING_VAR"));
        assert!(err.contains("engine.modelName"));
    }

    #[test]
    fn escaped_reference_stays_literal() {
        let v = json!({"key": "$${NOT_A_VAR}"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["key"], "${NOT_A_VAR}");
        assert!(collect_referenced_vars(&v).is_empty());
    }

    #[test]
    fn collects_referenced_vars() {
        let v = json!({"a": "${FOO}", "b": ["${BAR}", "${FOO}"]});
        assert_eq!(collect_referenced_vars(&v), vec!["BAR", "FOO"]);
    }

    #[test]
    fn overrides_apply_to_fields() {
        let config = apply_env_overrides(
            FolioConfig::default(),
            &env(&[
                ("FOLIO_DEBUG", "true"),
                ("FOLIO_TIMEOUT_MS", "2500"),
                ("FOLIO_LOG_LEVEL", "debug"),
                ("UNRELATED", "x"),
            ]),
        )
        .unwrap();
        assert!(config.mode.debug);
        assert_eq!(config.engine.timeout_ms, 2500);
        assert_eq!(config.logging.unwrap().level.as_deref(), Some("debug"));
    }

    #[test]
    fn bad_number_override_is_an_error() {
        let err = apply_env_overrides(FolioConfig::default(), &env(&[("FOLIO_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("FOLIO_TIMEOUT_MS"));
    }
}
