//! Settings Manager - optimistic toggles with persistence
//!
//! The control must reflect the click with zero latency, so the local
//! value flips before the gateway call. If persistence fails the
//! optimistic value is rolled back and the error surfaced; leaving the
//! unconfirmed value in place would break the store's mirror contract.

use std::sync::Arc;

use tracing::warn;

use storyweave_domain::Session;
use storyweave_ports::inbound::{StatusLine, UiSender};
use storyweave_ports::outbound::{GatewayPort, SettingKey};

use crate::{Reconciler, ServiceError, StateStore};

#[derive(Clone)]
pub struct SettingsService {
    gateway: Arc<dyn GatewayPort>,
    store: StateStore,
    reconciler: Reconciler,
    ui: UiSender,
}

impl SettingsService {
    pub fn new(
        gateway: Arc<dyn GatewayPort>,
        store: StateStore,
        reconciler: Reconciler,
        ui: UiSender,
    ) -> Self {
        Self {
            gateway,
            store,
            reconciler,
            ui,
        }
    }

    /// Apply the new value locally, then persist it. `show_reactions` is a
    /// pure display filter: hiding or showing reactions needs no further
    /// round trip beyond this persistence call. `auto_response` gates
    /// whether turn generation picks its own speaker.
    pub async fn toggle(&self, setting: SettingKey, value: bool) -> Result<(), ServiceError> {
        let previous = self.apply_local(setting, value);

        if let Err(err) = self.gateway.toggle_setting(setting, value).await {
            warn!(setting = setting.as_wire(), "settings persistence failed, rolling back");
            self.apply_local(setting, previous);
            self.ui.status(StatusLine::error(err.detail()));
            return Err(err.into());
        }

        self.reconciler.refresh().await?;
        Ok(())
    }

    /// Full-replace local update; returns the value being displaced
    fn apply_local(&self, setting: SettingKey, value: bool) -> bool {
        let mut snapshot = self.store.snapshot();
        let previous = match setting {
            SettingKey::AutoResponse => {
                std::mem::replace(&mut snapshot.auto_response_enabled, value)
            }
            SettingKey::ShowReactions => std::mem::replace(&mut snapshot.show_reactions, value),
        };
        self.store.replace(snapshot);
        previous
    }
}

/// Render helper: the reaction element shows only when both the message
/// carries one and the setting is on.
pub fn reaction_to_render<'a>(session: &'a Session, message_index: usize) -> Option<&'a str> {
    if !session.show_reactions {
        return None;
    }
    session
        .conversation
        .as_ref()?
        .messages
        .get(message_index)?
        .reaction
        .as_deref()
}
