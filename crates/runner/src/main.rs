//! Storyweave Runner - composition root binary
//!
//! Wires the HTTP gateway to the application services, performs the
//! initial state reconciliation, and logs the render-facing event stream.
//! The actual renderer is an external collaborator; it would take the
//! service handles and the event receiver built here.

use std::sync::Arc;

use futures_util::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storyweave_adapters::http::HttpGateway;
use storyweave_app::{
    ConversationService, NavigationService, Reconciler, SettingsService, StateStore,
    TurnOrchestrator,
};
use storyweave_ports::inbound::{UiEvent, UiSender};
use storyweave_ports::outbound::GatewayPort;

/// Service handles a renderer would hold
#[allow(dead_code)]
struct Services {
    store: StateStore,
    reconciler: Reconciler,
    orchestrator: TurnOrchestrator,
    settings: SettingsService,
    navigation: NavigationService,
    conversations: ConversationService,
}

fn wire(gateway: Arc<dyn GatewayPort>, ui: UiSender) -> Services {
    let store = StateStore::new();
    let reconciler = Reconciler::new(Arc::clone(&gateway), store.clone(), ui.clone());
    let orchestrator = TurnOrchestrator::new(
        Arc::clone(&gateway),
        store.clone(),
        reconciler.clone(),
        ui.clone(),
    );
    let settings = SettingsService::new(
        Arc::clone(&gateway),
        store.clone(),
        reconciler.clone(),
        ui.clone(),
    );
    let navigation = NavigationService::new(Arc::clone(&gateway), reconciler.clone(), ui.clone());
    let conversations = ConversationService::new(
        gateway,
        store.clone(),
        reconciler.clone(),
        orchestrator.clone(),
        ui,
    );
    Services {
        store,
        reconciler,
        orchestrator,
        settings,
        navigation,
        conversations,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storyweave=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_url = std::env::var("STORYWEAVE_API_URL")
        .unwrap_or_else(|_| "http://localhost:8000".to_string());
    tracing::info!(%api_url, "starting storyweave client");

    let gateway: Arc<dyn GatewayPort> = Arc::new(HttpGateway::new(&api_url)?);
    let (ui, mut ui_rx) = UiSender::channel();
    let services = wire(gateway, ui);

    // Without a renderer attached, the event stream goes to the log.
    tokio::spawn(async move {
        while let Some(event) = ui_rx.next().await {
            match event {
                UiEvent::Status(line) => tracing::info!(kind = ?line.kind, "{}", line.text),
                UiEvent::Thinking(indicator) => tracing::debug!(?indicator, "thinking"),
                UiEvent::ActiveCharacter(id) => tracing::debug!(?id, "active character"),
                UiEvent::InputCleared => tracing::debug!("input cleared"),
                UiEvent::StateReplaced => tracing::debug!("state replaced"),
            }
        }
    });

    services.reconciler.refresh().await?;

    let snapshot = services.store.snapshot();
    match &snapshot.conversation {
        Some(conversation) => tracing::info!(
            conversation = %conversation.id,
            name = %conversation.name,
            characters = conversation.characters.len(),
            messages = conversation.messages.len(),
            "session loaded"
        ),
        None => tracing::info!("no active conversation on the backend"),
    }

    Ok(())
}
