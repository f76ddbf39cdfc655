//! Structured logging for Folio.
//!
//! Handles log redaction, console and NDJSON file output, and transcript event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, TranscriptEvent};
pub use logger::{init_logger, LOG_FILE_PREFIX};
pub use redact::redact_sensitive_data;
