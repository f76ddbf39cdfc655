//! Response engines for the Folio chat assistant.
//!
//! - [`rules`]: ordered regex intent matching with canned replies
//! - [`local`]: a scripted on-device model with simulated streaming
//! - [`arbiter`]: picks between the two, owning the single initialization attempt
//! - [`detector`]: query-string mode signals and host device profile

pub mod arbiter;
pub mod detector;
pub mod local;
pub mod rules;

pub use arbiter::{Begin, EngineArbiter, InitOutcome, InitTicket, Phase, Route};
pub use detector::{DeviceInfo, LocalPolicy, ModeSignals};
pub use local::{split_tokens, stream_tokens, LocalEngine, LocalEngineLoader};
pub use rules::{classify, greeting, reply, respond, Intent, Reply};
