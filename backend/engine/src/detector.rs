//! Mode signals and device detection.
//!
//! The page URL may carry `forcelocal=1`, `nolocal=1` and `debug=1`. Together
//! with a rough device profile they decide whether the local engine is tried.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

static MOBILE_UA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)mobile|android|iphone|ipad|blackberry").unwrap());

/// Flags read from the page query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSignals {
    /// Try the local engine even on devices that look incapable.
    pub force_local: bool,
    /// Never try the local engine.
    pub disable_local: bool,
    /// Add diagnostics to the transcript.
    pub debug: bool,
}

impl ModeSignals {
    /// Parse a query string such as `?nolocal=1&debug=1`. Unknown keys are ignored.
    pub fn from_query(query: &str) -> Self {
        let mut signals = Self::default();
        let query = query.trim().trim_start_matches('?');
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let on = matches!(value, "1" | "true");
            match key {
                "forcelocal" => signals.force_local |= on,
                "nolocal" => signals.disable_local |= on,
                "debug" => signals.debug |= on,
                other => debug!(key = other, "Ignoring unknown query signal"),
            }
        }
        signals
    }

    /// Combine two signal sets; a flag set in either stays set.
    pub fn merge(self, other: ModeSignals) -> Self {
        Self {
            force_local: self.force_local || other.force_local,
            disable_local: self.disable_local || other.disable_local,
            debug: self.debug || other.debug,
        }
    }

    /// Decide whether local initialization may be attempted.
    ///
    /// The opt-out always wins. Device capability only matters when
    /// `require_capable_device` is set.
    pub fn local_policy(&self, device: &DeviceInfo, require_capable_device: bool) -> LocalPolicy {
        if self.disable_local {
            LocalPolicy::OptedOut
        } else if require_capable_device && !device.is_likely_capable(self) {
            LocalPolicy::IncapableDevice
        } else {
            LocalPolicy::Allowed
        }
    }
}

/// Whether the arbiter may try the local engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalPolicy {
    Allowed,
    OptedOut,
    IncapableDevice,
}

impl LocalPolicy {
    pub fn reason(&self) -> &'static str {
        match self {
            LocalPolicy::Allowed => "local engine allowed",
            LocalPolicy::OptedOut => "local mode disabled",
            LocalPolicy::IncapableDevice => "device not capable of running the local model",
        }
    }
}

/// Rough capability profile of the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// GPU compute available to the engine.
    pub accelerator: bool,
    pub memory_gb: Option<u64>,
    pub cores: Option<usize>,
    pub user_agent: String,
}

impl DeviceInfo {
    /// Profile of the current process.
    pub fn host() -> Self {
        Self {
            accelerator: false,
            memory_gb: None,
            cores: std::thread::available_parallelism().ok().map(|n| n.get()),
            user_agent: format!(
                "folio/{} ({}; {})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            ),
        }
    }

    pub fn is_mobile(&self) -> bool {
        MOBILE_UA.is_match(&self.user_agent)
    }

    /// Forced or debug sessions always count as capable; otherwise anything
    /// that isn't a mobile user agent does.
    pub fn is_likely_capable(&self, signals: &ModeSignals) -> bool {
        if signals.force_local || signals.debug {
            return true;
        }
        !self.is_mobile()
    }

    /// One-line diagnostics for debug sessions.
    pub fn summary(&self) -> String {
        let memory = self
            .memory_gb
            .map(|gb| gb.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let cores = self
            .cores
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        format!(
            "Debug info: WebGPU={}, Memory={}GB, Cores={}",
            self.accelerator, memory, cores
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(user_agent: &str) -> DeviceInfo {
        DeviceInfo {
            accelerator: false,
            memory_gb: Some(8),
            cores: Some(4),
            user_agent: user_agent.to_string(),
        }
    }

    #[test]
    fn test_parse_query_flags() {
        let signals = ModeSignals::from_query("?nolocal=1&debug=1&utm_source=x");
        assert!(signals.disable_local);
        assert!(signals.debug);
        assert!(!signals.force_local);
    }

    #[test]
    fn test_flag_requires_truthy_value() {
        assert_eq!(ModeSignals::from_query("forcelocal=0"), ModeSignals::default());
        assert_eq!(ModeSignals::from_query("debug"), ModeSignals::default());
        assert!(ModeSignals::from_query("forcelocal=true").force_local);
    }

    #[test]
    fn test_opt_out_wins_over_force() {
        let signals = ModeSignals::from_query("forcelocal=1&nolocal=1");
        assert_eq!(signals.local_policy(&device("desktop"), true), LocalPolicy::OptedOut);
    }

    #[test]
    fn test_mobile_devices_skip_local_only_when_required() {
        let phone = device("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)");
        let none = ModeSignals::default();
        assert!(phone.is_mobile());
        assert_eq!(none.local_policy(&phone, false), LocalPolicy::Allowed);
        assert_eq!(none.local_policy(&phone, true), LocalPolicy::IncapableDevice);

        let forced = ModeSignals::from_query("forcelocal=1");
        assert_eq!(forced.local_policy(&phone, true), LocalPolicy::Allowed);
    }

    #[test]
    fn test_merge_keeps_set_flags() {
        let merged = ModeSignals::from_query("debug=1").merge(ModeSignals::from_query("nolocal=1"));
        assert!(merged.debug && merged.disable_local);
    }

    #[test]
    fn test_summary_format() {
        let mut info = device("desktop");
        assert_eq!(info.summary(), "Debug info: WebGPU=false, Memory=8GB, Cores=4");
        info.memory_gb = None;
        assert!(info.summary().contains("Memory=unknownGB"));
    }
}
