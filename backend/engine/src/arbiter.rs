//! Engine arbitration.
//!
//! Decides, per session, whether replies come from the local engine or the
//! rule-based fallback. Owns the single initialization attempt: the load is
//! raced against the configured timeout and against an explicit cancel.
//!
//! ```text
//! Idle ──begin──▶ Initializing ──ok──────────▶ Local
//!  │                  │  └──timeout / error──▶ Fallback
//!  │                  └──cancel──▶ Idle
//!  └──opted out / incapable──▶ Fallback
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use folio_core::{ChatEngine, ChatMode, EngineConfig, EngineLoader, FolioError, ModelInfo};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::detector::LocalPolicy;

/// Arbiter lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Initializing,
    Local,
    Fallback,
}

impl Phase {
    /// The user-visible mode for this phase. An idle arbiter answers with rules.
    pub fn mode(&self) -> ChatMode {
        match self {
            Phase::Idle | Phase::Fallback => ChatMode::Fallback,
            Phase::Initializing => ChatMode::Initializing,
            Phase::Local => ChatMode::Local,
        }
    }
}

/// Result of asking the arbiter to start initializing.
#[derive(Debug)]
pub enum Begin {
    /// An attempt was started; pass the ticket to [`EngineArbiter::complete`].
    Started(InitTicket),
    /// Local mode is not allowed; the arbiter went straight to fallback.
    Skipped(LocalPolicy),
    /// Another attempt is already in flight.
    InProgress,
    /// The arbiter already settled on a mode.
    Settled(ChatMode),
}

/// Proof of an in-flight attempt.
#[derive(Debug)]
pub struct InitTicket {
    attempt: u64,
    cancel: CancellationToken,
}

/// How an initialization attempt ended.
#[derive(Debug)]
pub enum InitOutcome {
    Ready(ModelInfo),
    FellBack(FolioError),
    /// The attempt was cancelled or superseded; its result was discarded.
    Cancelled,
}

/// Where the next message should be answered.
pub enum Route {
    Local(Arc<dyn ChatEngine>),
    Fallback,
}

/// Returns the arbiter to idle if an attempt's future is dropped before it
/// commits a result.
struct AttemptGuard<'a> {
    arbiter: &'a EngineArbiter,
    attempt: u64,
    armed: bool,
}

impl AttemptGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.arbiter.state();
        if state.attempt == self.attempt && state.phase == Phase::Initializing {
            if let Some(token) = state.cancel.take() {
                token.cancel();
            }
            state.attempt += 1;
            state.phase = Phase::Idle;
            warn!(attempt = self.attempt, "Initialization dropped before completing");
        }
    }
}

struct ArbiterState {
    phase: Phase,
    engine: Option<Arc<dyn ChatEngine>>,
    attempt: u64,
    cancel: Option<CancellationToken>,
    last_failure: Option<String>,
}

pub struct EngineArbiter {
    loader: Arc<dyn EngineLoader>,
    config: EngineConfig,
    policy: LocalPolicy,
    state: Mutex<ArbiterState>,
}

impl EngineArbiter {
    pub fn new(loader: Arc<dyn EngineLoader>, config: EngineConfig, policy: LocalPolicy) -> Self {
        Self {
            loader,
            config,
            policy,
            state: Mutex::new(ArbiterState {
                phase: Phase::Idle,
                engine: None,
                attempt: 0,
                cancel: None,
                last_failure: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ArbiterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state().phase
    }

    pub fn mode(&self) -> ChatMode {
        self.phase().mode()
    }

    pub fn is_initializing(&self) -> bool {
        self.phase() == Phase::Initializing
    }

    /// Why the last attempt fell back, if it did.
    pub fn last_failure(&self) -> Option<String> {
        self.state().last_failure.clone()
    }

    /// Pick the engine for the next message.
    pub fn route(&self) -> Route {
        let state = self.state();
        match (&state.phase, &state.engine) {
            (Phase::Local, Some(engine)) => Route::Local(Arc::clone(engine)),
            _ => Route::Fallback,
        }
    }

    /// Start an attempt if the arbiter is idle.
    pub fn begin(&self) -> Begin {
        let mut state = self.state();
        match state.phase {
            Phase::Initializing => return Begin::InProgress,
            Phase::Local | Phase::Fallback => return Begin::Settled(state.phase.mode()),
            Phase::Idle => {}
        }

        if self.policy != LocalPolicy::Allowed {
            info!(reason = self.policy.reason(), "Skipping local engine");
            state.phase = Phase::Fallback;
            state.last_failure = Some(self.policy.reason().to_string());
            return Begin::Skipped(self.policy);
        }

        state.attempt += 1;
        let cancel = CancellationToken::new();
        state.cancel = Some(cancel.clone());
        state.phase = Phase::Initializing;

        info!(attempt = state.attempt, timeout_ms = self.config.timeout_ms, "Initializing local engine");
        Begin::Started(InitTicket {
            attempt: state.attempt,
            cancel,
        })
    }

    /// Run the attempt behind `ticket` to completion and commit its result.
    ///
    /// Dropping the returned future mid-load abandons the attempt like
    /// [`cancel`](Self::cancel) does.
    pub async fn complete(&self, ticket: InitTicket) -> InitOutcome {
        let mut guard = AttemptGuard {
            arbiter: self,
            attempt: ticket.attempt,
            armed: true,
        };
        let timeout = self.config.timeout();
        let load = self.loader.load(&self.config);

        let result = tokio::select! {
            _ = ticket.cancel.cancelled() => None,
            res = tokio::time::timeout(timeout, load) => Some(res),
        };
        guard.disarm();

        let mut state = self.state();
        let Some(result) = result else {
            info!(attempt = ticket.attempt, "Initialization cancelled");
            return InitOutcome::Cancelled;
        };
        if state.attempt != ticket.attempt || state.phase != Phase::Initializing {
            info!(attempt = ticket.attempt, "Discarding superseded initialization result");
            return InitOutcome::Cancelled;
        }
        state.cancel = None;

        let error = match result {
            Ok(Ok(engine)) if engine.is_ready() => {
                let model = engine.model_info();
                info!(model = %model.name, "Local engine initialized");
                state.engine = Some(engine);
                state.phase = Phase::Local;
                state.last_failure = None;
                return InitOutcome::Ready(model);
            }
            Ok(Ok(_)) => FolioError::InitializationFailure("engine reported not ready".to_string()),
            Ok(Err(e)) => e,
            Err(_) => FolioError::InitializationTimeout(timeout),
        };

        warn!(error = %error, "Local engine failed, using fallback");
        state.engine = None;
        state.phase = Phase::Fallback;
        state.last_failure = Some(error.to_string());
        InitOutcome::FellBack(error)
    }

    /// Abandon an in-flight attempt and return to idle.
    ///
    /// Returns `false` when nothing was in flight.
    pub fn cancel(&self) -> bool {
        let mut state = self.state();
        if state.phase != Phase::Initializing {
            return false;
        }
        if let Some(token) = state.cancel.take() {
            token.cancel();
        }
        state.attempt += 1;
        state.phase = Phase::Idle;
        info!("Local engine initialization cancelled");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalEngineLoader;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Sleeps for a fixed time, then delegates to the real loader.
    struct SlowLoader(Duration);

    #[async_trait]
    impl EngineLoader for SlowLoader {
        async fn load(&self, config: &EngineConfig) -> Result<Arc<dyn ChatEngine>, FolioError> {
            tokio::time::sleep(self.0).await;
            LocalEngineLoader::with_seed(1).load(config).await
        }
    }

    struct FailingLoader;

    #[async_trait]
    impl EngineLoader for FailingLoader {
        async fn load(&self, _config: &EngineConfig) -> Result<Arc<dyn ChatEngine>, FolioError> {
            Err(FolioError::InitializationFailure("no GPU".into()))
        }
    }

    fn arbiter(loader: impl EngineLoader + 'static) -> EngineArbiter {
        EngineArbiter::new(Arc::new(loader), EngineConfig::default(), LocalPolicy::Allowed)
    }

    fn started(begin: Begin) -> InitTicket {
        match begin {
            Begin::Started(ticket) => ticket,
            other => panic!("expected a started attempt, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_load_goes_local() {
        let arbiter = arbiter(LocalEngineLoader::with_seed(1));
        assert_eq!(arbiter.mode(), ChatMode::Fallback);

        let ticket = started(arbiter.begin());
        assert_eq!(arbiter.mode(), ChatMode::Initializing);

        let outcome = arbiter.complete(ticket).await;
        assert!(matches!(outcome, InitOutcome::Ready(_)));
        assert_eq!(arbiter.mode(), ChatMode::Local);
        assert!(matches!(arbiter.route(), Route::Local(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_load_times_out_to_fallback() {
        let arbiter = arbiter(SlowLoader(Duration::from_secs(20)));
        let ticket = started(arbiter.begin());

        let outcome = arbiter.complete(ticket).await;
        assert!(matches!(
            outcome,
            InitOutcome::FellBack(FolioError::InitializationTimeout(_))
        ));
        assert_eq!(arbiter.mode(), ChatMode::Fallback);
        assert!(matches!(arbiter.route(), Route::Fallback));
        assert!(arbiter.last_failure().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_loader_error_falls_back_without_retry() {
        let arbiter = arbiter(FailingLoader);
        let ticket = started(arbiter.begin());
        assert!(matches!(arbiter.complete(ticket).await, InitOutcome::FellBack(_)));
        assert!(matches!(arbiter.begin(), Begin::Settled(ChatMode::Fallback)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_one_attempt_in_flight() {
        let arbiter = arbiter(LocalEngineLoader::with_seed(1));
        let _ticket = started(arbiter.begin());
        assert!(matches!(arbiter.begin(), Begin::InProgress));
        assert!(arbiter.is_initializing());
    }

    #[test]
    fn test_opt_out_skips_straight_to_fallback() {
        let arbiter = EngineArbiter::new(
            Arc::new(LocalEngineLoader::new()),
            EngineConfig::default(),
            LocalPolicy::OptedOut,
        );
        assert!(matches!(arbiter.begin(), Begin::Skipped(LocalPolicy::OptedOut)));
        assert_eq!(arbiter.phase(), Phase::Fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_attempt_returns_to_idle() {
        let arbiter = Arc::new(arbiter(SlowLoader(Duration::from_secs(5))));
        let ticket = started(arbiter.begin());

        let pending = {
            let arbiter = Arc::clone(&arbiter);
            tokio::spawn(async move { arbiter.complete(ticket).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());

        assert_eq!(arbiter.phase(), Phase::Idle);
        assert!(!arbiter.cancel());
        let retry = started(arbiter.begin());
        assert!(matches!(arbiter.complete(retry).await, InitOutcome::Ready(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_caller_leaves_arbiter_idle() {
        let arbiter = arbiter(SlowLoader(Duration::from_secs(5)));
        let ticket = started(arbiter.begin());
        let gave_up = tokio::time::timeout(Duration::from_secs(1), arbiter.complete(ticket)).await;
        assert!(gave_up.is_err());
        assert_eq!(arbiter.mode(), ChatMode::Fallback);
        assert_eq!(arbiter.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_abandons_attempt_and_allows_retry() {
        let arbiter = Arc::new(arbiter(SlowLoader(Duration::from_secs(5))));
        let ticket = started(arbiter.begin());

        let pending = {
            let arbiter = Arc::clone(&arbiter);
            tokio::spawn(async move { arbiter.complete(ticket).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(arbiter.cancel());
        assert!(!arbiter.cancel());
        assert!(matches!(pending.await.unwrap(), InitOutcome::Cancelled));
        assert_eq!(arbiter.phase(), Phase::Idle);

        let retry = started(arbiter.begin());
        assert!(matches!(arbiter.complete(retry).await, InitOutcome::Ready(_)));
        assert_eq!(arbiter.mode(), ChatMode::Local);
    }
}
