//! ConversationStore port - State the UI renders conversations from.

use async_trait::async_trait;

use crate::domain::conversation::{Conversation, ConversationStatus, Message};
use crate::domain::foundation::{ConversationId, DomainError};

/// Result of appending a message to a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageAppend {
    /// Message added at the end of the conversation.
    Appended,
    /// Same delivery already present; nothing changed.
    Duplicate,
    /// The conversation is not in the store; nothing changed.
    UnknownConversation,
}

/// Port for the conversation store.
///
/// Implementations must apply mutations in call order; the realtime layer
/// relies on that to keep messages in delivery order.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Insert or replace a whole conversation.
    async fn set_conversation(&self, conversation: Conversation) -> Result<(), DomainError>;

    /// Append a message to its conversation.
    async fn add_message(&self, message: Message) -> Result<MessageAppend, DomainError>;

    /// Change a conversation's status. Returns false if the conversation is unknown.
    async fn set_status(
        &self,
        id: &ConversationId,
        status: ConversationStatus,
    ) -> Result<bool, DomainError>;

    /// Fetch a conversation snapshot.
    async fn get(&self, id: &ConversationId) -> Result<Option<Conversation>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn ConversationStore) {}
}
