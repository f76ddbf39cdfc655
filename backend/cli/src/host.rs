//! Terminal implementations of the chat host capabilities.

use std::sync::{Mutex, PoisonError};

use folio_core::{ChatMode, Downloader, Mailer, Navigator, Notifier, StatusIndicator, ThemeMode, ThemeSetter};
use tracing::{info, warn};

use crate::terminal_output::{note_info, note_warn, DIM, RESET, supports_color};
use crate::theme_store::ThemeStore;

/// Prints what a browser would do and persists the theme flag.
pub struct TerminalHost {
    store: ThemeStore,
    theme: Mutex<ThemeMode>,
}

impl TerminalHost {
    /// Start from the persisted theme, or `default_theme` when none is saved.
    pub fn new(store: ThemeStore, default_theme: ThemeMode) -> Self {
        let theme = store.load().unwrap_or(default_theme);
        Self { store, theme: Mutex::new(theme) }
    }
}

impl Navigator for TerminalHost {
    fn navigate_to(&self, target: &str) {
        note_info(&format!("Scrolling to {target}"));
    }

    fn open_external(&self, url: &str) {
        note_info(&format!("Open in browser: {url}"));
    }
}

impl ThemeSetter for TerminalHost {
    fn set_theme(&self, mode: ThemeMode) {
        *self.theme.lock().unwrap_or_else(PoisonError::into_inner) = mode;
        if let Err(e) = self.store.save(mode) {
            warn!(error = %e, path = %self.store.path().display(), "Failed to persist theme");
        }
        info!(theme = %mode, "Theme changed");
    }

    fn current_theme(&self) -> ThemeMode {
        *self.theme.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Downloader for TerminalHost {
    fn download(&self, url: &str, filename: &str) {
        note_info(&format!("Downloading {url} as {filename}"));
    }
}

impl Mailer for TerminalHost {
    fn compose(&self, address: &str) {
        note_info(&format!("Compose email: mailto:{address}"));
    }
}

impl Notifier for TerminalHost {
    fn warn(&self, title: &str, body: &str) {
        note_warn(&format!("{title}: {body}"));
    }
}

impl StatusIndicator for TerminalHost {
    fn show_mode(&self, mode: ChatMode) {
        if supports_color() {
            println!("{DIM}● {} ({}){RESET}", mode.label(), mode.description());
        } else {
            println!("[{}] {}", mode.label(), mode.description());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_theme_persists_and_reloads() {
        let path = std::env::temp_dir()
            .join(format!("folio-host-{}", uuid::Uuid::new_v4()))
            .join("theme.json");

        let host = TerminalHost::new(ThemeStore::new(&path), ThemeMode::Dark);
        assert_eq!(host.current_theme(), ThemeMode::Dark);
        host.set_theme(ThemeMode::Light);

        let reopened = TerminalHost::new(ThemeStore::new(&path), ThemeMode::Dark);
        assert_eq!(reopened.current_theme(), ThemeMode::Light);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
