//! Builds a chat session from config and command-line flags.

use std::path::Path;
use std::sync::Arc;

use folio_chat::ChatController;
use folio_config::{FolioConfig, DEFAULT_THEME_FILE};
use folio_core::Capabilities;
use folio_engine::{DeviceInfo, EngineArbiter, LocalEngineLoader, ModeSignals};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::host::TerminalHost;
use crate::theme_store::ThemeStore;
use crate::ModeFlags;

/// Config signals, then the query string, then explicit flags; a flag set
/// anywhere stays set.
pub fn resolve_signals(config: &FolioConfig, flags: &ModeFlags) -> ModeSignals {
    let query = flags
        .query
        .as_deref()
        .map(ModeSignals::from_query)
        .unwrap_or_default();
    let explicit = ModeSignals {
        force_local: flags.force_local,
        disable_local: flags.no_local,
        debug: flags.debug,
    };
    config.mode.signals().merge(query).merge(explicit)
}

pub fn build_session(config: &FolioConfig, config_dir: &Path, flags: &ModeFlags) -> Arc<ChatController> {
    let signals = resolve_signals(config, flags);
    let device = DeviceInfo::host();
    let policy = signals.local_policy(&device, config.mode.require_capable_device);
    let seed = flags.seed.or(config.profile.seed);
    info!(?signals, ?policy, seed, "Starting chat session");

    let loader = match seed {
        Some(seed) => LocalEngineLoader::with_seed(seed),
        None => LocalEngineLoader::new(),
    };
    let arbiter = EngineArbiter::new(Arc::new(loader), config.engine.clone(), policy);

    let theme_file = config.profile.theme_file.as_deref().unwrap_or(DEFAULT_THEME_FILE);
    let host = Arc::new(TerminalHost::new(
        ThemeStore::new(config_dir.join(theme_file)),
        config.profile.default_theme,
    ));

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut controller = ChatController::new(
        arbiter,
        Capabilities::from_host(host),
        config.chat.clone(),
        &mut rng,
    );
    if signals.debug {
        controller = controller.with_diagnostics(device.summary());
    }
    Arc::new(controller)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_and_query_merge_with_config() {
        let mut config = FolioConfig::default();
        config.mode.debug = true;
        let flags = ModeFlags {
            query: Some("?nolocal=1".into()),
            force_local: true,
            ..Default::default()
        };
        let signals = resolve_signals(&config, &flags);
        assert!(signals.debug && signals.disable_local && signals.force_local);
    }

    #[test]
    fn no_flags_keep_config_signals() {
        let signals = resolve_signals(&FolioConfig::default(), &ModeFlags::default());
        assert_eq!(signals, ModeSignals::default());
    }
}
