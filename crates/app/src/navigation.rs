//! Navigation Cursor - directional moves through the history window
//!
//! The backend owns index arithmetic and boundary clamping; the client
//! adopts whatever position comes back and re-reads the full snapshot.

use std::sync::Arc;

use storyweave_ports::inbound::{StatusLine, UiSender};
use storyweave_ports::outbound::{GatewayPort, NavDirection, NavPosition};

use crate::{Reconciler, ServiceError};

#[derive(Clone)]
pub struct NavigationService {
    gateway: Arc<dyn GatewayPort>,
    reconciler: Reconciler,
    ui: UiSender,
}

impl NavigationService {
    pub fn new(gateway: Arc<dyn GatewayPort>, reconciler: Reconciler, ui: UiSender) -> Self {
        Self {
            gateway,
            reconciler,
            ui,
        }
    }

    /// Issue a directional move and adopt the returned position verbatim.
    pub async fn move_cursor(&self, direction: NavDirection) -> Result<NavPosition, ServiceError> {
        let outcome = async {
            let position = self.gateway.navigate(direction).await?;
            self.reconciler.refresh().await?;
            Ok::<_, ServiceError>(position)
        }
        .await;

        match outcome {
            Ok(position) => {
                self.ui.status(StatusLine::info(format!(
                    "Message {} of {}",
                    position.current_index + 1,
                    position.total_messages
                )));
                Ok(position)
            }
            Err(err) => {
                self.ui.status(StatusLine::error(err.user_message()));
                Err(err)
            }
        }
    }
}
