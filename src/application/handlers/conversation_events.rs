//! ConversationEventHandler - Applies conversation events to the conversation store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::realtime::{EventKind, InboundEvent};
use crate::ports::{ConversationStore, EventHandler, MessageAppend};

/// Keeps the conversation store in sync with the server.
///
/// - `conversation_start` / `conversation_get_by_id` replace the snapshot
/// - `conversation_send_message` appends, deduplicating echoes
/// - `conversation_end` updates the status
///
/// A message for a conversation the store does not hold is logged and
/// dropped; the store is left unchanged.
pub struct ConversationEventHandler {
    store: Arc<dyn ConversationStore>,
}

impl ConversationEventHandler {
    /// Event kinds this handler owns.
    pub const KINDS: [EventKind; 4] = [
        EventKind::ConversationStart,
        EventKind::ConversationEnd,
        EventKind::ConversationSendMessage,
        EventKind::ConversationGetById,
    ];

    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventHandler for ConversationEventHandler {
    async fn handle(&self, event: &InboundEvent) -> Result<(), DomainError> {
        match event {
            InboundEvent::ConversationStart(conversation)
            | InboundEvent::ConversationGetById(conversation) => {
                self.store.set_conversation(conversation.clone()).await
            }
            InboundEvent::ConversationSendMessage(message) => {
                match self.store.add_message(message.clone()).await? {
                    MessageAppend::Appended => {}
                    MessageAppend::Duplicate => {
                        tracing::trace!(
                            conversation_id = %message.conversation_id,
                            "Duplicate message ignored"
                        );
                    }
                    MessageAppend::UnknownConversation => {
                        tracing::debug!(
                            conversation_id = %message.conversation_id,
                            "Message for unknown conversation dropped"
                        );
                    }
                }
                Ok(())
            }
            InboundEvent::ConversationEnd(ended) => {
                let known = self
                    .store
                    .set_status(&ended.conversation_id, ended.status)
                    .await?;
                if !known {
                    tracing::debug!(
                        conversation_id = %ended.conversation_id,
                        "Status change for unknown conversation dropped"
                    );
                }
                Ok(())
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
        "ConversationEventHandler"
    }
}
