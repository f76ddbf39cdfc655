use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the Folio chat assistant.
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("engine initialization timed out after {}ms", .0.as_millis())]
    InitializationTimeout(Duration),

    #[error("engine initialization failed: {0}")]
    InitializationFailure(String),

    #[error("engine not ready")]
    EngineNotReady,

    #[error("rate limit exceeded: retry in {}ms", .retry_after.as_millis())]
    RateLimitExceeded { retry_after: Duration },

    #[error("response generation failed: {0}")]
    ResponseGeneration(String),

    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FolioError {
    /// Whether this error came out of engine initialization.
    pub fn is_initialization(&self) -> bool {
        matches!(
            self,
            FolioError::InitializationTimeout(_) | FolioError::InitializationFailure(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_reports_millis() {
        let err = FolioError::InitializationTimeout(Duration::from_secs(15));
        assert_eq!(err.to_string(), "engine initialization timed out after 15000ms");
        assert!(err.is_initialization());
        assert!(!FolioError::EngineNotReady.is_initialization());
    }
}
