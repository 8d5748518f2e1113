//! Conversation lifecycle - create, grow, annotate, save, load
//!
//! Direct request/response plumbing around the gateway: each operation is
//! validate → call → full refresh → status line. No ordering semantics
//! beyond that.

use std::sync::Arc;

use tracing::info;

use storyweave_domain::CharacterId;
use storyweave_ports::inbound::{Indicator, StatusLine, UiSender};
use storyweave_ports::outbound::{
    GatewayPort, ImageUpload, NewConversation, SavedConversation,
};

use crate::{Reconciler, ServiceError, StateStore, TurnOrchestrator};

#[derive(Clone)]
pub struct ConversationService {
    gateway: Arc<dyn GatewayPort>,
    store: StateStore,
    reconciler: Reconciler,
    orchestrator: TurnOrchestrator,
    ui: UiSender,
}

impl ConversationService {
    pub fn new(
        gateway: Arc<dyn GatewayPort>,
        store: StateStore,
        reconciler: Reconciler,
        orchestrator: TurnOrchestrator,
        ui: UiSender,
    ) -> Self {
        Self {
            gateway,
            store,
            reconciler,
            orchestrator,
            ui,
        }
    }

    /// Create a new conversation. The backend seeds the narrator and the
    /// two characters and starts the cursor at -1 (nothing shown yet).
    /// Cancels any pending chained reply: the new story replaces the old
    /// conversation just like `load` does, and a stale automatic turn must
    /// not land in it.
    pub async fn create(&self, request: NewConversation) -> Result<(), ServiceError> {
        if request.character1_name.trim().is_empty() || request.character2_name.trim().is_empty() {
            return self.surface(ServiceError::validation(
                "Please provide names for both characters",
            ));
        }

        self.orchestrator.cancel_chain();

        self.ui.thinking(Indicator::Generic);
        self.ui.status(StatusLine::info("Creating story..."));

        let outcome = async {
            let id = self.gateway.create_conversation(request).await?;
            info!(conversation = %id, "conversation created");
            self.reconciler.refresh().await
        }
        .await;

        self.ui.thinking(Indicator::Off);
        match outcome {
            Ok(()) => {
                self.ui.status(StatusLine::success(
                    "Story created! Click on a character to begin.",
                ));
                Ok(())
            }
            Err(err) => self.surface(err),
        }
    }

    /// Add a character to the active conversation. An empty description is
    /// allowed; the backend writes one itself.
    pub async fn add_character(&self, name: &str, description: &str) -> Result<(), ServiceError> {
        if self.store.read(|s| s.conversation.is_none()) {
            return self.surface(ServiceError::no_conversation());
        }
        if name.trim().is_empty() {
            return self.surface(ServiceError::validation("Please provide a character name"));
        }

        self.ui.thinking(Indicator::Generic);
        let outcome = async {
            self.gateway.add_character(name.trim(), description).await?;
            self.reconciler.refresh().await
        }
        .await;

        self.ui.thinking(Indicator::Off);
        match outcome {
            Ok(()) => {
                self.ui.status(StatusLine::success("Character added!"));
                Ok(())
            }
            Err(err) => self.surface(err),
        }
    }

    /// Update the scenario's steering fields. `None` leaves a field alone.
    pub async fn update_scenario(
        &self,
        what_happens_next: Option<&str>,
        never_forget: Option<&str>,
    ) -> Result<(), ServiceError> {
        if self.store.read(|s| s.conversation.is_none()) {
            return self.surface(ServiceError::no_conversation());
        }

        let outcome = async {
            self.gateway
                .update_scenario(what_happens_next, never_forget)
                .await?;
            self.reconciler.refresh().await
        }
        .await;

        match outcome {
            Ok(()) => {
                self.ui.status(StatusLine::success("Scenario updated"));
                Ok(())
            }
            Err(err) => self.surface(err),
        }
    }

    /// Persist the active conversation; returns the assigned filename.
    pub async fn save(&self) -> Result<String, ServiceError> {
        if self.store.read(|s| s.conversation.is_none()) {
            return self.surface(ServiceError::validation("No conversation to save"));
        }

        match self.gateway.save_conversation().await {
            Ok(saved) => {
                self.ui
                    .status(StatusLine::success(format!("Saved as {}", saved.filename)));
                Ok(saved.filename)
            }
            Err(err) => self.surface(err.into()),
        }
    }

    /// List saved conversations for the load dialog.
    pub async fn list(&self) -> Result<Vec<SavedConversation>, ServiceError> {
        match self.gateway.list_conversations().await {
            Ok(conversations) => Ok(conversations),
            Err(err) => self.surface(err.into()),
        }
    }

    /// Replace the session with a saved conversation. Cancels any pending
    /// chained reply first; a stale automatic turn must not land in the
    /// conversation the user just moved to. The selection hint clears
    /// implicitly with the replacement, and the backend parks the cursor on
    /// the newest message.
    pub async fn load(&self, filename: &str) -> Result<(), ServiceError> {
        self.orchestrator.cancel_chain();

        let outcome = async {
            self.gateway.load_conversation(filename).await?;
            self.reconciler.refresh().await
        }
        .await;

        match outcome {
            Ok(()) => {
                self.ui.status(StatusLine::success("Conversation loaded"));
                Ok(())
            }
            Err(err) => self.surface(err),
        }
    }

    /// Upload a portrait for one of the two image-bearing characters.
    pub async fn upload_image(
        &self,
        character_id: &CharacterId,
        upload: ImageUpload,
    ) -> Result<(), ServiceError> {
        let snapshot = self.store.snapshot();
        let Some(conversation) = &snapshot.conversation else {
            return self.surface(ServiceError::no_conversation());
        };
        if !conversation.accepts_image(character_id) {
            return self.surface(ServiceError::validation(
                "This character cannot receive an image",
            ));
        }

        let outcome = async {
            self.gateway
                .upload_character_image(character_id, upload)
                .await?;
            self.reconciler.refresh().await
        }
        .await;

        match outcome {
            Ok(()) => {
                self.ui.status(StatusLine::success("Image uploaded"));
                Ok(())
            }
            Err(err) => self.surface(err),
        }
    }

    /// Emit the status line for a failure and hand it back to the caller
    fn surface<T>(&self, err: ServiceError) -> Result<T, ServiceError> {
        self.ui.status(StatusLine::error(err.user_message()));
        Err(err)
    }
}
