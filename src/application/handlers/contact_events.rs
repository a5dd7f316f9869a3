//! ContactEventHandler - Applies contact events to the contact store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::realtime::{EventKind, InboundEvent};
use crate::ports::{ContactStore, EventHandler};

/// Keeps the agent portal's contact list and notes current.
pub struct ContactEventHandler {
    store: Arc<dyn ContactStore>,
}

impl ContactEventHandler {
    pub const KINDS: [EventKind; 4] = [
        EventKind::ContactCreated,
        EventKind::ContactUpdated,
        EventKind::ContactDeleted,
        EventKind::ContactNoteCreated,
    ];

    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventHandler for ContactEventHandler {
    async fn handle(&self, event: &InboundEvent) -> Result<(), DomainError> {
        match event {
            InboundEvent::ContactCreated(contact) => self.store.on_created(contact.clone()).await,
            InboundEvent::ContactUpdated(contact) => self.store.on_updated(contact.clone()).await,
            InboundEvent::ContactDeleted(deleted) => {
                if !self.store.on_deleted(&deleted.id).await? {
                    tracing::debug!(contact_id = %deleted.id, "Deleted contact was not listed");
                }
                Ok(())
            }
            InboundEvent::ContactNoteCreated(note) => {
                self.store.on_note_created(note.clone()).await
            }
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
        "ContactEventHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stores::InMemoryContactStore;
    use crate::domain::contact::{Contact, ContactDeleted, ContactNote};
    use crate::domain::foundation::{ContactId, NoteId};

    fn contact(id: &str) -> Contact {
        Contact {
            id: ContactId::new(id).unwrap(),
            name: Some("Grace".to_string()),
            email: Some("grace@example.com".to_string()),
            phone: None,
            custom_attributes: Default::default(),
        }
    }

    #[tokio::test]
    async fn contact_lifecycle() {
        let store = InMemoryContactStore::new();
        let handler = ContactEventHandler::new(Arc::new(store.clone()));
        let id = ContactId::new("ct1").unwrap();

        handler
            .handle(&InboundEvent::ContactCreated(contact("ct1")))
            .await
            .unwrap();
        handler
            .handle(&InboundEvent::ContactNoteCreated(ContactNote {
                id: NoteId::new("n1").unwrap(),
                contact_id: id.clone(),
                content: "VIP".to_string(),
                author_id: None,
                created_at: None,
            }))
            .await
            .unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.notes_for(&id).await.len(), 1);

        handler
            .handle(&InboundEvent::ContactDeleted(ContactDeleted { id: id.clone() }))
            .await
            .unwrap();
        assert!(store.is_empty().await);

        // Deleting again is harmless.
        assert!(handler
            .handle(&InboundEvent::ContactDeleted(ContactDeleted { id }))
            .await
            .is_ok());
    }
}
