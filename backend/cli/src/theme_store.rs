//! Persisted theme flag.
//!
//! A small JSON object of string keys; only `theme` is used. Unknown keys are
//! kept on save.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use folio_core::ThemeMode;
use tracing::{debug, warn};

const THEME_KEY: &str = "theme";

pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", self.path.display()))
    }

    /// The saved theme, if any. A corrupt file counts as unset.
    pub fn load(&self) -> Option<ThemeMode> {
        let map = match self.read_map() {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable theme file");
                return None;
            }
        };
        map.get(THEME_KEY).and_then(|raw| raw.parse().ok())
    }

    pub fn save(&self, theme: ThemeMode) -> Result<()> {
        let mut map = self.read_map().unwrap_or_default();
        map.insert(THEME_KEY.to_string(), theme.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&map)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        debug!(path = %self.path.display(), theme = %theme, "Saved theme");
        Ok(())
    }
}
