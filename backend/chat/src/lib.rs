//! The chat session: drawer visibility, transcript, rate limiting, slash
//! commands, response orchestration and action dispatch.

pub mod controller;
pub mod session;
pub mod settings;
pub mod throttle;

pub use controller::{ChatController, SendOutcome};
pub use session::SessionSnapshot;
pub use settings::ChatSettings;
pub use throttle::SendThrottle;
