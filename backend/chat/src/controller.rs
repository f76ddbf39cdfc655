//! Chat session controller.
//!
//! Owns one session's transcript and drawer state, throttles sends, runs
//! slash commands, routes messages through the [`EngineArbiter`] and turns
//! actions into calls on the host [`Capabilities`]. Every change is also
//! published as a [`ChatEvent`] for rendering layers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use folio_commands::{
    build_default_dispatcher, detect_command, unknown_command_reply, CommandContext,
    CommandDispatcher, CommandRegistry, SlashInput,
};
use folio_core::{
    Action, ActionType, Capabilities, ChatEvent, ChatMode, EventBus, FolioError, HistoryTurn,
    Message, MessageId, Role, ThemeMode, TokenSink,
};
use folio_engine::{greeting, reply, Begin, EngineArbiter, InitOutcome, InitTicket, Route};
use folio_logging::{EventLogger, TranscriptEvent};
use rand::Rng;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::session::{SessionSnapshot, SessionState};
use crate::settings::ChatSettings;
use crate::throttle::SendThrottle;

pub const LOADING_NOTICE: &str = "Loading on-device model (~1.5GB)...";
pub const LOCAL_READY_NOTICE: &str = "Local AI model ready! Ask me anything about the portfolio.";
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

fn fallback_notice(reason: &str) -> String {
    format!("Local model unavailable: {reason}. Using fast fallback responses.")
}

/// What happened to a call to [`ChatController::send_message`].
#[derive(Debug)]
pub enum SendOutcome {
    /// Blank input; nothing changed.
    Ignored,
    /// Too soon after the previous send; the user was warned. Holds
    /// [`FolioError::RateLimitExceeded`].
    RateLimited(FolioError),
    /// A slash command ran; holds its system acknowledgement.
    Command(Message),
    /// The completed bot reply.
    Replied(Message),
    /// Generation failed and the apology was appended.
    Failed(FolioError),
}

pub struct ChatController {
    session_id: String,
    settings: ChatSettings,
    arbiter: EngineArbiter,
    caps: Capabilities,
    registry: CommandRegistry,
    dispatcher: CommandDispatcher,
    events: EventBus,
    state: Mutex<SessionState>,
}

impl ChatController {
    /// Create a session and append the greeting.
    pub fn new<R: Rng + ?Sized>(
        arbiter: EngineArbiter,
        caps: Capabilities,
        settings: ChatSettings,
        rng: &mut R,
    ) -> Self {
        let throttle = SendThrottle::new(settings.min_send_interval());
        let controller = Self {
            session_id: Uuid::new_v4().to_string(),
            settings,
            arbiter,
            caps,
            registry: CommandRegistry::new(),
            dispatcher: build_default_dispatcher(),
            events: EventBus::new(),
            state: Mutex::new(SessionState::new(throttle)),
        };

        info!(session = %controller.session_id, "Chat session created");
        controller.caps.status.show_mode(controller.arbiter.mode());

        let hello = greeting(rng);
        controller.append(Message::bot(hello.text, hello.actions));
        controller
    }

    /// Append a diagnostics notice after the greeting.
    pub fn with_diagnostics(self, summary: impl Into<String>) -> Self {
        self.append(Message::system(summary));
        self
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn mode(&self) -> ChatMode {
        self.arbiter.mode()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        SessionSnapshot {
            session_id: self.session_id.clone(),
            is_open: state.is_open,
            mode: self.arbiter.mode(),
            is_initializing: self.arbiter.is_initializing(),
            messages: state.messages.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Visibility
    // -----------------------------------------------------------------------

    /// Show the drawer. Starts the engine in the background if it has never
    /// been started; the handle resolves when that attempt settles.
    pub fn open(self: &Arc<Self>) -> Option<JoinHandle<InitOutcome>> {
        self.set_open(true);
        let ticket = self.start_initialization()?;
        let this = Arc::clone(self);
        Some(tokio::spawn(async move { this.finish_initialization(ticket).await }))
    }

    /// Hide the drawer. In-flight work keeps running.
    pub fn close(&self) {
        self.set_open(false);
    }

    /// Flip visibility and return the new state.
    pub fn toggle(self: &Arc<Self>) -> bool {
        if self.is_open() {
            self.close();
            false
        } else {
            // A started attempt finishes on its own.
            let _ = self.open();
            true
        }
    }

    fn set_open(&self, open: bool) {
        let changed = {
            let mut state = self.state();
            std::mem::replace(&mut state.is_open, open) != open
        };
        if changed {
            debug!(session = %self.session_id, open, "Chat visibility changed");
            self.events.publish(ChatEvent::VisibilityChanged { open });
        }
    }

    // -----------------------------------------------------------------------
    // Engine lifecycle
    // -----------------------------------------------------------------------

    /// Run one initialization attempt to completion.
    ///
    /// Returns `None` when no attempt was started: one is already running,
    /// the mode is settled, or local mode is not allowed.
    pub async fn initialize_engine(&self) -> Option<InitOutcome> {
        let ticket = self.start_initialization()?;
        Some(self.finish_initialization(ticket).await)
    }

    /// Start the engine after the configured post-greeting delay.
    pub fn spawn_auto_init(self: &Arc<Self>) -> JoinHandle<Option<InitOutcome>> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(this.settings.auto_init_delay()).await;
            this.initialize_engine().await
        })
    }

    /// Abandon an in-flight initialization. The session answers with rules
    /// until a later open starts a new attempt.
    pub fn cancel_initialization(&self) -> bool {
        if !self.arbiter.cancel() {
            return false;
        }
        self.set_status(self.arbiter.mode());
        true
    }

    fn start_initialization(&self) -> Option<InitTicket> {
        match self.arbiter.begin() {
            Begin::Started(ticket) => {
                self.set_status(ChatMode::Initializing);
                self.append(Message::system(LOADING_NOTICE));
                Some(ticket)
            }
            Begin::Skipped(policy) => {
                self.set_status(ChatMode::Fallback);
                self.announce_fallback(policy.reason());
                None
            }
            Begin::InProgress | Begin::Settled(_) => None,
        }
    }

    async fn finish_initialization(&self, ticket: InitTicket) -> InitOutcome {
        let outcome = self.arbiter.complete(ticket).await;
        match &outcome {
            InitOutcome::Ready(model) => {
                info!(session = %self.session_id, model = %model.name, "Chat using local engine");
                self.set_status(ChatMode::Local);
                self.announce_local();
            }
            InitOutcome::FellBack(error) => {
                self.set_status(ChatMode::Fallback);
                self.announce_fallback(&error.to_string());
            }
            InitOutcome::Cancelled => {}
        }
        outcome
    }

    fn set_status(&self, mode: ChatMode) {
        self.caps.status.show_mode(mode);
        self.events.publish(ChatEvent::ModeChanged { mode });
        EventLogger::log_event(
            &self.session_id,
            TranscriptEvent::ModeChange { mode: mode.to_string() },
        );
    }

    fn announce_local(&self) {
        let first = !std::mem::replace(&mut self.state().announced_local, true);
        if first {
            self.append(Message::system(LOCAL_READY_NOTICE));
        }
    }

    fn announce_fallback(&self, reason: &str) {
        let first = !std::mem::replace(&mut self.state().announced_fallback, true);
        if first {
            self.append(Message::system(fallback_notice(reason)));
        }
    }

    // -----------------------------------------------------------------------
    // Sending
    // -----------------------------------------------------------------------

    /// Handle one line of user input.
    pub async fn send_message(&self, raw: &str) -> SendOutcome {
        let text = raw.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        let throttled = self.state().throttle.check(Instant::now());
        if let Err(error) = throttled {
            warn!(session = %self.session_id, error = %error, "Message rate limited");
            self.caps.notifier.warn("Please wait", "Sending messages too quickly");
            return SendOutcome::RateLimited(error);
        }

        if let Some(slash) = detect_command(text, &self.registry) {
            return SendOutcome::Command(self.run_command(slash).await);
        }

        EventLogger::log_event(
            &self.session_id,
            TranscriptEvent::Message { role: Role::User.to_string(), content: text.to_string() },
        );
        self.append(Message::user(text));
        let pending = self.append(Message::placeholder());

        match self.generate(text, pending.id).await {
            Ok(message) => SendOutcome::Replied(message),
            Err(error) => {
                warn!(session = %self.session_id, error = %error, "Response generation failed");
                EventLogger::log_event(
                    &self.session_id,
                    TranscriptEvent::Error { error_msg: error.to_string() },
                );
                self.remove(pending.id);
                self.append(Message::bot(APOLOGY, Vec::new()));
                SendOutcome::Failed(error)
            }
        }
    }

    async fn generate(&self, prompt: &str, pending: MessageId) -> Result<Message, FolioError> {
        let history: Vec<HistoryTurn> = self
            .state()
            .history(self.settings.history_window)
            .into_iter()
            .map(HistoryTurn::from)
            .collect();

        match self.arbiter.route() {
            Route::Local(engine) => {
                debug!(session = %self.session_id, engine = engine.name(), history = history.len(), "Routing to local engine");
                let mut on_token = |token: &str| self.push_token(pending, token);
                let sink: TokenSink<'_> = &mut on_token;
                let text = engine.chat(prompt, &history, Some(sink)).await?;
                self.complete(pending, text, Vec::new())
            }
            Route::Fallback => {
                debug!(session = %self.session_id, "Routing to rule-based replies");
                let answer = reply(prompt);
                self.complete(pending, answer.text, answer.actions)
            }
        }
    }

    fn push_token(&self, id: MessageId, token: &str) {
        let found = match self.state().find_mut(id) {
            Some(message) => {
                message.text.push_str(token);
                true
            }
            None => false,
        };
        if found {
            self.events.publish(ChatEvent::Token { id, token: token.to_string() });
        }
    }

    fn complete(&self, id: MessageId, text: String, actions: Vec<Action>) -> Result<Message, FolioError> {
        let message = {
            let mut state = self.state();
            let message = state.find_mut(id).ok_or_else(|| {
                FolioError::ResponseGeneration("reply placeholder is gone".to_string())
            })?;
            message.text = text;
            message.actions = actions;
            message.streaming = false;
            message.clone()
        };
        EventLogger::log_event(
            &self.session_id,
            TranscriptEvent::Message { role: Role::Bot.to_string(), content: message.text.clone() },
        );
        self.events.publish(ChatEvent::MessageCompleted { message: message.clone() });
        Ok(message)
    }

    async fn run_command(&self, slash: SlashInput) -> Message {
        let text = match slash {
            SlashInput::Unknown(name) => {
                debug!(session = %self.session_id, command = %name, "Unknown slash command");
                unknown_command_reply(&name, &self.registry)
            }
            SlashInput::Command(inv) => {
                EventLogger::log_event(
                    &self.session_id,
                    TranscriptEvent::Command { name: inv.key.clone(), args: inv.raw_args.clone() },
                );
                let ctx = CommandContext {
                    current_theme: self.caps.theme.current_theme(),
                    resume_path: self.settings.resume_path.clone(),
                    resume_filename: self.settings.resume_filename.clone(),
                };
                match self.dispatcher.dispatch(&ctx, &inv).await {
                    Ok(response) => {
                        if let Some(action) = &response.action {
                            if let Err(error) = self.handle_action(action) {
                                warn!(command = %inv.key, error = %error, "Command action failed");
                            }
                        }
                        response.text
                    }
                    Err(error) => {
                        warn!(command = %inv.key, error = %error, "Command failed");
                        format!("Command /{} failed: {error}", inv.key)
                    }
                }
            }
        };
        self.append(Message::system(text))
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Perform an action button's effect through the host capabilities.
    pub fn handle_action(&self, action: &Action) -> Result<(), FolioError> {
        let target = action.target.trim();
        if target.is_empty() {
            return Err(FolioError::InvalidAction(format!("{} action has no target", action.action_type)));
        }
        info!(session = %self.session_id, action = %action.action_type, action_target = target, "Handling action");

        match action.action_type {
            ActionType::Jump => self.caps.navigator.navigate_to(target),
            ActionType::Download => self.caps.downloader.download(target, action.suggested_filename()),
            ActionType::Email => self.caps.mailer.compose(target),
            ActionType::Link => self.caps.navigator.open_external(target),
            ActionType::Theme => {
                let mode: ThemeMode = target.parse()?;
                self.caps.theme.set_theme(mode);
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transcript
    // -----------------------------------------------------------------------

    fn append(&self, message: Message) -> Message {
        self.state().messages.push(message.clone());
        self.events.publish(ChatEvent::MessageAppended { message: message.clone() });
        message
    }

    fn remove(&self, id: MessageId) {
        let removed = self.state().remove(id);
        if removed.is_some() {
            self.events.publish(ChatEvent::MessageRemoved { id });
        }
    }
}
