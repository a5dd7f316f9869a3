//! Command-line realtime client.
//!
//! Connects with the identity from `SUPPORT_REALTIME__SESSION__*`, subscribes
//! the configured topics and logs every inbound event until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tracing::info;

use support_realtime::adapters::stores::{
    InMemoryAccountStore, InMemoryContactStore, InMemoryConversationStore, InMemoryInboxStore,
};
use support_realtime::adapters::websocket::TungsteniteConnector;
use support_realtime::config::AppConfig;
use support_realtime::domain::foundation::DomainError;
use support_realtime::domain::realtime::{EventKind, InboundEvent};
use support_realtime::ports::{EventHandler, EventSubscriber};
use support_realtime::telemetry::init_tracing;
use support_realtime::{RealtimeSession, StoreSet};

/// Logs each inbound event with its topic.
struct EventLogger;

#[async_trait]
impl EventHandler for EventLogger {
    async fn handle(&self, event: &InboundEvent) -> Result<(), DomainError> {
        info!(event = %event.kind(), topic = %event.topic(), "Inbound event");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "EventLogger"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    init_tracing(&config.logging);
    config.validate().context("validating configuration")?;

    info!(version = env!("CARGO_PKG_VERSION"), "support-realtime starting");

    let session_config = config
        .session
        .as_ref()
        .context("SUPPORT_REALTIME__SESSION__ID and __TENANT must be set")?;
    let identity = session_config.identity()?;
    let topics = session_config.topic_list()?;

    let stores = StoreSet::new(
        Arc::new(InMemoryConversationStore::new()),
        Arc::new(InMemoryContactStore::new()),
        Arc::new(InMemoryInboxStore::new()),
        Arc::new(InMemoryAccountStore::new()),
    );
    let connector = Arc::new(TungsteniteConnector::new());
    let session = RealtimeSession::from_config(&config, connector, stores)?;
    session
        .router()
        .register_all(&EventKind::ALL, Arc::new(EventLogger));

    for topic in topics {
        session.api().subscribe(topic);
    }
    session.connect(identity);

    let mut status = session.watch_status();
    let watcher = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = *status.borrow_and_update();
            if current.is_connection_lost() {
                tracing::error!(attempts = current.attempt, "Connection lost; giving up");
            } else {
                info!(state = ?current.state, attempt = current.attempt, "Connection state");
            }
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;

    info!("Shutting down");
    session.disconnect();
    drop(session);
    let _ = watcher.await;
    Ok(())
}
