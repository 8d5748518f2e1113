//! Reconciler - the single point where local and remote state converge
//!
//! Every mutating operation ends with `refresh()` on success: fetch the
//! full snapshot, swap the store. No service computes a partial update to
//! conversation fields; the trade is one extra round trip per action for
//! zero client-side merge logic. When refreshes overlap, the last one to
//! complete wins.

use std::sync::Arc;

use tracing::debug;

use storyweave_ports::inbound::{UiEvent, UiSender};
use storyweave_ports::outbound::GatewayPort;

use crate::{ServiceError, StateStore};

#[derive(Clone)]
pub struct Reconciler {
    gateway: Arc<dyn GatewayPort>,
    store: StateStore,
    ui: UiSender,
}

impl Reconciler {
    pub fn new(gateway: Arc<dyn GatewayPort>, store: StateStore, ui: UiSender) -> Self {
        Self { gateway, store, ui }
    }

    /// Fetch the complete session snapshot and replace the store contents.
    ///
    /// The selected-character hint is client-local and absent from the
    /// wire snapshot; it survives a refresh only while the same
    /// conversation still contains that character. A replaced conversation
    /// clears it implicitly.
    pub async fn refresh(&self) -> Result<(), ServiceError> {
        let mut fresh = self.gateway.fetch_state().await?;

        let previous = self.store.snapshot();
        if let (Some(selected), Some(old_conv)) =
            (&previous.selected_character_id, &previous.conversation)
        {
            let still_valid = fresh
                .conversation
                .as_ref()
                .is_some_and(|c| c.id == old_conv.id && c.has_character(selected));
            if still_valid {
                fresh.selected_character_id = Some(selected.clone());
            }
        }

        debug!(
            messages = fresh.message_count(),
            index = fresh.current_message_index,
            "session snapshot refreshed"
        );

        self.store.replace(fresh);
        self.ui.send(UiEvent::StateReplaced);
        Ok(())
    }
}
