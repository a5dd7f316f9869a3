//! Conversation domain module.
//!
//! A conversation is one support thread between a contact and the agents of
//! an inbox. The realtime layer receives whole conversations
//! (`conversation_start`, `conversation_get_by_id`), single messages
//! (`conversation_send_message`) and status changes (`conversation_end`).

mod message;

pub use message::{Message, SenderType};

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ContactId, ConversationId, InboxId, Timestamp, UserId};

/// Lifecycle status of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    #[default]
    Open,
    Pending,
    Closed,
}

/// A conversation snapshot as pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbox_id: Option<InboxId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<ContactId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,

    #[serde(default)]
    pub status: ConversationStatus,

    #[serde(default)]
    pub messages: Vec<Message>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Conversation {
    /// Creates an empty open conversation.
    pub fn new(id: ConversationId) -> Self {
        Self {
            id,
            inbox_id: None,
            contact_id: None,
            assignee_id: None,
            status: ConversationStatus::Open,
            messages: Vec::new(),
            created_at: None,
        }
    }

    /// Appends a message unless the same delivery is already present.
    ///
    /// Returns true if the message was appended.
    pub fn push_message(&mut self, message: Message) -> bool {
        if self.messages.iter().any(|m| m.is_same_delivery(&message)) {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Returns true if the conversation no longer accepts messages.
    pub fn is_closed(&self) -> bool {
        self.status == ConversationStatus::Closed
    }
}

/// Payload of `conversation_end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEnded {
    #[serde(alias = "id")]
    pub conversation_id: ConversationId,

    /// Status to apply; servers that omit it mean `closed`.
    #[serde(default = "closed_status")]
    pub status: ConversationStatus,
}

fn closed_status() -> ConversationStatus {
    ConversationStatus::Closed
}
