//! Turn Orchestrator - who speaks next, and when
//!
//! The one component with real temporal semantics. It owns the turn state
//! machine, the manual-message → single-automatic-reply chain, and the
//! thinking indicator lifecycle. Turn generation is single-shot per
//! trigger: the chain never loops, and arming a new chain cancels any
//! pending one, so at most one automatic reply can ever be outstanding.
//!
//! Every operation ends back in `Idle` with the indicator off, on success
//! and on failure alike. Overlapping triggers are rejected with `Busy`
//! rather than interleaved.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::{debug, warn};

use storyweave_domain::CharacterId;
use storyweave_ports::inbound::{Indicator, StatusLine, UiEvent, UiSender};
use storyweave_ports::outbound::GatewayPort;

use crate::{Reconciler, ServiceError, StateStore};

/// Delay between a committed manual message and the chained automatic
/// reply. Purely perceptual: the manual message should paint before the
/// thinking state appears.
pub const CHAIN_DELAY: Duration = Duration::from_millis(800);

/// States of the turn machine
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    /// A manual message is in flight
    Sending,
    /// A generation request is in flight, optionally tagged with the
    /// responding character's name for the indicator
    Generating { character: Option<String> },
    /// A manual send just committed; one automatic reply is pending
    ChainScheduled,
}

struct Inner {
    gateway: Arc<dyn GatewayPort>,
    store: StateStore,
    reconciler: Reconciler,
    ui: UiSender,
    state: Mutex<TurnState>,
    /// Abort handle of the pending chain task, when one is armed
    chain: Mutex<Option<AbortHandle>>,
    chain_delay: Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Clone)]
pub struct TurnOrchestrator {
    inner: Arc<Inner>,
}

impl TurnOrchestrator {
    pub fn new(
        gateway: Arc<dyn GatewayPort>,
        store: StateStore,
        reconciler: Reconciler,
        ui: UiSender,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                gateway,
                store,
                reconciler,
                ui,
                state: Mutex::new(TurnState::Idle),
                chain: Mutex::new(None),
                chain_delay: CHAIN_DELAY,
            }),
        }
    }

    /// Override the chain delay (tests use a few milliseconds)
    pub fn with_chain_delay(self, delay: Duration) -> Self {
        let inner = Arc::new(Inner {
            gateway: Arc::clone(&self.inner.gateway),
            store: self.inner.store.clone(),
            reconciler: self.inner.reconciler.clone(),
            ui: self.inner.ui.clone(),
            state: Mutex::new(TurnState::Idle),
            chain: Mutex::new(None),
            chain_delay: delay,
        });
        Self { inner }
    }

    pub fn state(&self) -> TurnState {
        lock(&self.inner.state).clone()
    }

    /// Send a user-authored message as the given character, falling back
    /// to the session's selected character when `character_id` is `None`.
    ///
    /// Validation happens before any gateway contact. On success the input
    /// is cleared and, when auto-response is enabled, exactly one
    /// automatic reply is scheduled after [`CHAIN_DELAY`].
    pub async fn send_manual(
        &self,
        character_id: Option<CharacterId>,
        content: &str,
    ) -> Result<(), ServiceError> {
        let content = content.trim();
        if content.is_empty() {
            return self.reject(ServiceError::validation("Please enter a message"));
        }
        let snapshot = self.inner.store.snapshot();
        if snapshot.conversation.is_none() {
            return self.reject(ServiceError::no_conversation());
        }
        let Some(character_id) = character_id.or(snapshot.selected_character_id) else {
            return self.reject(ServiceError::validation("Please select a character"));
        };

        // A new manual send supersedes any reply still pending from the
        // previous one.
        self.cancel_chain();
        self.claim(TurnState::Sending)?;

        let outcome = self.perform_send(&character_id, content).await;
        match outcome {
            Ok(auto_response) => {
                if auto_response {
                    self.set_state(TurnState::ChainScheduled);
                    self.arm_chain();
                } else {
                    self.set_state(TurnState::Idle);
                }
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    async fn perform_send(
        &self,
        character_id: &CharacterId,
        content: &str,
    ) -> Result<bool, ServiceError> {
        self.inner
            .gateway
            .send_manual_message(character_id, content)
            .await?;
        self.inner.ui.send(UiEvent::InputCleared);
        self.inner.reconciler.refresh().await?;
        Ok(self.inner.store.read(|s| s.auto_response_enabled))
    }

    /// Request the next turn. With auto-response enabled the backend may
    /// pick the speaker (`None`); otherwise an explicit character is
    /// required and its absence is a validation error that never reaches
    /// the gateway.
    pub async fn generate(&self, character_id: Option<CharacterId>) -> Result<(), ServiceError> {
        let snapshot = self.inner.store.snapshot();
        let Some(conversation) = &snapshot.conversation else {
            return self.reject(ServiceError::no_conversation());
        };
        if !snapshot.auto_response_enabled && character_id.is_none() {
            return self.reject(ServiceError::validation("Please select a character"));
        }

        let character_name = character_id
            .as_ref()
            .and_then(|id| conversation.character(id))
            .map(|c| c.name.clone());

        self.claim(TurnState::Generating {
            character: character_name.clone(),
        })?;
        self.run_generation(character_id, character_name).await
    }

    /// Gateway call plus refresh under the thinking indicator. Assumes the
    /// machine is already claimed as `Generating`.
    async fn run_generation(
        &self,
        character_id: Option<CharacterId>,
        character_name: Option<String>,
    ) -> Result<(), ServiceError> {
        let indicator = match character_name {
            Some(name) => Indicator::Named(name),
            None => Indicator::Generic,
        };
        self.inner.ui.thinking(indicator);

        let outcome = async {
            self.inner
                .gateway
                .generate_message(character_id.as_ref())
                .await?;
            self.inner.reconciler.refresh().await
        }
        .await;

        self.set_state(TurnState::Idle);
        self.inner.ui.thinking(Indicator::Off);
        match outcome {
            Ok(()) => {
                debug!("turn generated");
                Ok(())
            }
            Err(err) => {
                self.inner.ui.status(StatusLine::error(err.user_message()));
                Err(err)
            }
        }
    }

    /// Record the user's character pick and light up its card. Selection
    /// is deliberately just a selection; pair it with [`generate`] via
    /// [`take_turn`] for the click-to-speak gesture.
    pub fn select_character(&self, character_id: &CharacterId) -> Result<(), ServiceError> {
        let mut snapshot = self.inner.store.snapshot();
        if let Err(err) = snapshot.select_character(character_id.clone()) {
            return self.reject(err.into());
        }
        self.inner.store.replace(snapshot);
        self.inner
            .ui
            .send(UiEvent::ActiveCharacter(Some(character_id.clone())));
        Ok(())
    }

    /// The character-card click: select, then immediately generate that
    /// character's turn. Two sequenced operations, not a fused one.
    pub async fn take_turn(&self, character_id: &CharacterId) -> Result<(), ServiceError> {
        self.select_character(character_id)?;
        self.generate(Some(character_id.clone())).await
    }

    /// Discard and regenerate the most recent message.
    pub async fn regenerate(&self) -> Result<(), ServiceError> {
        let message_count = self.inner.store.read(|s| s.message_count());
        if self.inner.store.read(|s| s.conversation.is_none()) || message_count == 0 {
            return self.reject(ServiceError::validation("No messages to regenerate"));
        }

        self.claim(TurnState::Generating { character: None })?;
        self.inner.ui.status(StatusLine::info("Regenerating..."));

        let outcome = async {
            self.inner.gateway.regenerate_last().await?;
            self.inner.reconciler.refresh().await
        }
        .await;

        self.set_state(TurnState::Idle);
        match outcome {
            Ok(()) => {
                self.inner.ui.status(StatusLine::info("Ready"));
                Ok(())
            }
            Err(err) => {
                self.inner.ui.thinking(Indicator::Off);
                self.inner.ui.status(StatusLine::error(err.user_message()));
                Err(err)
            }
        }
    }

    /// Edit a message in place. A `None` reaction leaves the stored
    /// reaction untouched; content and reaction travel in one request.
    pub async fn edit_message(
        &self,
        index: usize,
        content: &str,
        reaction: Option<&str>,
    ) -> Result<(), ServiceError> {
        let message_count = self.inner.store.read(|s| s.message_count());
        if self.inner.store.read(|s| s.conversation.is_none()) {
            return self.reject(ServiceError::no_conversation());
        }
        if index >= message_count {
            return self.reject(ServiceError::validation("Message not found"));
        }

        self.claim(TurnState::Sending)?;

        let outcome = async {
            self.inner
                .gateway
                .edit_message(index, content, reaction)
                .await?;
            self.inner.reconciler.refresh().await
        }
        .await;

        self.set_state(TurnState::Idle);
        match outcome {
            Ok(()) => {
                self.inner.ui.status(StatusLine::success("Message edited"));
                Ok(())
            }
            Err(err) => {
                self.inner.ui.status(StatusLine::error(err.user_message()));
                Err(err)
            }
        }
    }

    /// Abort a pending chained reply, if any. Called on new manual sends
    /// and when the conversation is replaced under the user.
    pub fn cancel_chain(&self) {
        {
            let mut state = lock(&self.inner.state);
            if *state != TurnState::ChainScheduled {
                // Nothing pending; a chain that already fired is a normal
                // in-flight generation and must not be killed mid-request.
                return;
            }
            *state = TurnState::Idle;
        }
        if let Some(handle) = lock(&self.inner.chain).take() {
            handle.abort();
            debug!("pending chained reply cancelled");
        }
    }

    /// Arm the one-shot chained reply. The machine is `ChainScheduled`
    /// until the timer fires; firing transitions it to `Generating` and
    /// invokes generation exactly once, with the backend picking the
    /// speaker.
    fn arm_chain(&self) {
        let inner = Arc::clone(&self.inner);
        let orchestrator = Self {
            inner: Arc::clone(&self.inner),
        };
        let handle = tokio::spawn(async move {
            tokio::time::sleep(inner.chain_delay).await;
            orchestrator.fire_chain().await;
        });
        if let Some(previous) = lock(&self.inner.chain).replace(handle.abort_handle()) {
            previous.abort();
        }
    }

    async fn fire_chain(&self) {
        {
            let mut state = lock(&self.inner.state);
            if *state != TurnState::ChainScheduled {
                // cancelled or superseded between sleep and fire
                return;
            }
            *state = TurnState::Generating { character: None };
        }
        lock(&self.inner.chain).take();

        if let Err(err) = self.run_generation(None, None).await {
            warn!(error = %err, "chained reply failed");
        }
    }

    /// Enter a non-idle state, rejecting overlap
    fn claim(&self, next: TurnState) -> Result<(), ServiceError> {
        let mut state = lock(&self.inner.state);
        if *state != TurnState::Idle {
            drop(state);
            return self.reject(ServiceError::Busy);
        }
        *state = next;
        Ok(())
    }

    fn set_state(&self, next: TurnState) {
        *lock(&self.inner.state) = next;
    }

    /// Validation/overlap failure before any gateway contact
    fn reject<T>(&self, err: ServiceError) -> Result<T, ServiceError> {
        self.inner.ui.status(StatusLine::error(err.user_message()));
        Err(err)
    }

    /// Gateway failure after the machine was claimed
    fn fail(&self, err: ServiceError) -> Result<(), ServiceError> {
        self.set_state(TurnState::Idle);
        self.inner.ui.thinking(Indicator::Off);
        self.inner.ui.status(StatusLine::error(err.user_message()));
        Err(err)
    }
}
