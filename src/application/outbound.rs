//! Outbound API - typed fire-and-forget requests.
//!
//! Every method builds one request and hands it to the transport. Nothing
//! here waits for the server: acknowledgements come back later as inbound
//! events through the router.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use crate::adapters::websocket::Transport;
use crate::domain::foundation::{ConversationId, UserId};
use crate::domain::realtime::{OutboundEvent, Topic};

/// Client-side request API for one session.
#[derive(Debug, Clone)]
pub struct RealtimeApi {
    transport: Transport,
    /// Conversations with an active typing indicator.
    typing: Arc<Mutex<HashSet<ConversationId>>>,
}

impl RealtimeApi {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            typing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Sends a chat message. Blank content is rejected and nothing is sent.
    ///
    /// Each message carries a fresh echo id so the server's echo can be
    /// matched against the optimistic copy.
    pub fn send_message(
        &self,
        conversation_id: ConversationId,
        content: impl Into<String>,
        is_private: bool,
    ) {
        let content = content.into();
        if content.trim().is_empty() {
            tracing::warn!(conversation_id = %conversation_id, "Refusing to send empty message");
            return;
        }
        self.transport.send(OutboundEvent::SendMessage {
            conversation_id,
            content,
            is_private,
            echo_id: Uuid::new_v4().to_string(),
        });
    }

    /// Shows the typing indicator. Repeated calls send one frame.
    pub fn start_typing(&self, conversation_id: ConversationId) {
        if self.typing_state().insert(conversation_id.clone()) {
            self.transport.send(OutboundEvent::TypingStart(conversation_id));
        }
    }

    /// Hides the typing indicator. No frame unless typing was started.
    pub fn stop_typing(&self, conversation_id: ConversationId) {
        if self.typing_state().remove(&conversation_id) {
            self.transport.send(OutboundEvent::TypingStop(conversation_id));
        }
    }

    pub fn is_typing(&self, conversation_id: &ConversationId) -> bool {
        self.typing_state().contains(conversation_id)
    }

    /// Forgets all typing indicators without sending anything.
    pub fn reset_typing(&self) {
        self.typing_state().clear();
    }

    pub fn subscribe(&self, topic: Topic) {
        self.transport.subscribe(topic);
    }

    pub fn unsubscribe(&self, topic: Topic) {
        self.transport.unsubscribe(topic);
    }

    pub fn assign_conversation(&self, conversation_id: ConversationId, agent_id: UserId) {
        self.transport.send(OutboundEvent::AssignConversation {
            conversation_id,
            agent_id,
        });
    }

    /// Asks the server to push a fresh `conversation_get_by_id`.
    pub fn request_conversation(&self, conversation_id: ConversationId) {
        self.transport
            .send(OutboundEvent::RequestConversation(conversation_id));
    }

    fn typing_state(&self) -> std::sync::MutexGuard<'_, HashSet<ConversationId>> {
        self.typing.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
