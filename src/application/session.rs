//! RealtimeSession - the single owner of one realtime connection.
//!
//! A session wires the pieces together once: its own router with the four
//! domain handlers registered, exactly one transport, and the outbound API
//! bound to that transport. Nothing is global; embedders hold the session
//! and pass it (or its API handle) where needed.

use std::sync::Arc;

use tokio::sync::watch;

use crate::adapters::events::EventRouter;
use crate::adapters::websocket::{Transport, TransportOptions};
use crate::config::{AppConfig, ValidationError};
use crate::domain::realtime::{ConnectionStatus, SessionIdentity};
use crate::ports::{
    AccountStore, Connector, ContactStore, ConversationStore, EventSubscriber, InboxStore,
};

use super::handlers::{
    CompanyEventHandler, ContactEventHandler, ConversationEventHandler, InboxEventHandler,
};
use super::outbound::RealtimeApi;

/// The external stores the domain handlers write to.
#[derive(Clone)]
pub struct StoreSet {
    pub conversations: Arc<dyn ConversationStore>,
    pub contacts: Arc<dyn ContactStore>,
    pub inboxes: Arc<dyn InboxStore>,
    pub account: Arc<dyn AccountStore>,
}

impl StoreSet {
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        contacts: Arc<dyn ContactStore>,
        inboxes: Arc<dyn InboxStore>,
        account: Arc<dyn AccountStore>,
    ) -> Self {
        Self {
            conversations,
            contacts,
            inboxes,
            account,
        }
    }
}

/// One realtime session: one router, one transport, one API.
pub struct RealtimeSession {
    router: Arc<EventRouter>,
    transport: Transport,
    api: RealtimeApi,
}

impl RealtimeSession {
    /// Builds the session and spawns its transport worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(options: TransportOptions, connector: Arc<dyn Connector>, stores: StoreSet) -> Self {
        let router = Arc::new(EventRouter::new());
        register_domain_handlers(router.as_ref(), stores);

        let transport = Transport::spawn(options, connector, Arc::clone(&router));
        let api = RealtimeApi::new(transport.clone());

        Self {
            router,
            transport,
            api,
        }
    }

    /// Builds the session from loaded configuration.
    ///
    /// The configuration is validated first.
    pub fn from_config(
        config: &AppConfig,
        connector: Arc<dyn Connector>,
        stores: StoreSet,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self::new(config.transport_options()?, connector, stores))
    }

    /// Starts connecting as `identity`. No-op while connecting or open.
    pub fn connect(&self, identity: SessionIdentity) {
        self.transport.connect(identity);
    }

    /// Closes the connection and cancels pending retries.
    ///
    /// Subscriptions are kept and replayed on the next `connect`; call
    /// [`clear_subscriptions`](Self::clear_subscriptions) to forget them.
    pub fn disconnect(&self) {
        self.api.reset_typing();
        self.transport.disconnect();
    }

    pub fn clear_subscriptions(&self) {
        self.transport.clear_subscriptions();
    }

    /// Outbound request API.
    pub fn api(&self) -> &RealtimeApi {
        &self.api
    }

    /// Handler registry, for registering handlers beyond the built-in ones.
    pub fn router(&self) -> &Arc<EventRouter> {
        &self.router
    }

    pub fn status(&self) -> ConnectionStatus {
        self.transport.status()
    }

    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.transport.watch_status()
    }
}

fn register_domain_handlers(router: &dyn EventSubscriber, stores: StoreSet) {
    router.register_all(
        &ConversationEventHandler::KINDS,
        Arc::new(ConversationEventHandler::new(stores.conversations)),
    );
    router.register_all(
        &ContactEventHandler::KINDS,
        Arc::new(ContactEventHandler::new(stores.contacts)),
    );
    router.register_all(
        &InboxEventHandler::KINDS,
        Arc::new(InboxEventHandler::new(stores.inboxes)),
    );
    router.register_all(
        &CompanyEventHandler::KINDS,
        Arc::new(CompanyEventHandler::new(stores.account)),
    );
}
