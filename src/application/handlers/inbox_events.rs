//! InboxEventHandler - Applies inbox events to the inbox store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::realtime::{EventKind, InboundEvent};
use crate::ports::{EventHandler, InboxStore};

pub struct InboxEventHandler {
    store: Arc<dyn InboxStore>,
}

impl InboxEventHandler {
    pub const KINDS: [EventKind; 2] = [EventKind::InboxCreated, EventKind::InboxUpdated];

    pub fn new(store: Arc<dyn InboxStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventHandler for InboxEventHandler {
    async fn handle(&self, event: &InboundEvent) -> Result<(), DomainError> {
        match event {
            InboundEvent::InboxCreated(inbox) => self.store.on_created(inbox.clone()).await,
            InboundEvent::InboxUpdated(inbox) => self.store.on_updated(inbox.clone()).await,
            other => {
                tracing::debug!(
                    handler = self.name(),
                    event = %other.kind(),
                    "Event not handled here"
                );
                Ok(())
            }
        }
    }

    fn name(&self) -> &'static str {
        "InboxEventHandler"
    }
}
