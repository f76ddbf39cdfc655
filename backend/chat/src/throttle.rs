//! Minimum-interval send limiter.

use std::time::Duration;

use folio_core::FolioError;
use tokio::time::Instant;
use tracing::debug;

/// Accepts at most one send per `min_interval`. Rejected attempts do not
/// push the window forward.
#[derive(Debug, Clone)]
pub struct SendThrottle {
    min_interval: Duration,
    last_accepted: Option<Instant>,
}

impl SendThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: None,
        }
    }

    /// Record a send at `now` if allowed, otherwise report how long to wait.
    pub fn check(&mut self, now: Instant) -> Result<(), FolioError> {
        if let Some(last) = self.last_accepted {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.min_interval {
                let retry_after = self.min_interval - elapsed;
                debug!(retry_after_ms = retry_after.as_millis() as u64, "Send throttled");
                return Err(FolioError::RateLimitExceeded { retry_after });
            }
        }
        self.last_accepted = Some(now);
        Ok(())
    }

    pub fn last_accepted(&self) -> Option<Instant> {
        self.last_accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_send_inside_window_is_rejected() {
        let mut throttle = SendThrottle::new(Duration::from_millis(1000));
        let t0 = Instant::now();
        assert!(throttle.check(t0).is_ok());
        match throttle.check(t0 + Duration::from_millis(400)) {
            Err(FolioError::RateLimitExceeded { retry_after }) => {
                assert_eq!(retry_after, Duration::from_millis(600))
            }
            other => panic!("expected a rate limit, got {other:?}"),
        }
        assert!(throttle.check(t0 + Duration::from_millis(1000)).is_ok());
    }

    #[test]
    fn test_rejections_do_not_extend_window() {
        let mut throttle = SendThrottle::new(Duration::from_millis(1000));
        let t0 = Instant::now();
        throttle.check(t0).unwrap();
        throttle.check(t0 + Duration::from_millis(900)).unwrap_err();
        assert!(throttle.check(t0 + Duration::from_millis(1001)).is_ok());
        assert_eq!(throttle.last_accepted(), Some(t0 + Duration::from_millis(1001)));
    }
}
