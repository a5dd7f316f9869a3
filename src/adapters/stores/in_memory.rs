//! In-memory store implementations.
//!
//! Back the CLI and the tests. A UI embedding the client supplies its own
//! store adapters.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::{Company, UserPatch};
use crate::domain::contact::{Contact, ContactNote};
use crate::domain::conversation::{Conversation, ConversationStatus, Message};
use crate::domain::foundation::{ContactId, ConversationId, DomainError, InboxId};
use crate::domain::inbox::Inbox;
use crate::ports::{AccountStore, ContactStore, ConversationStore, InboxStore, MessageAppend};

// ============================================
// Conversations
// ============================================

/// Conversations keyed by id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    conversations: Arc<RwLock<HashMap<ConversationId, Conversation>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of conversations held.
    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn set_conversation(&self, conversation: Conversation) -> Result<(), DomainError> {
        self.conversations
            .write()
            .await
            .insert(conversation.id.clone(), conversation);
        Ok(())
    }

    async fn add_message(&self, message: Message) -> Result<MessageAppend, DomainError> {
        let mut conversations = self.conversations.write().await;
        let Some(conversation) = conversations.get_mut(&message.conversation_id) else {
            return Ok(MessageAppend::UnknownConversation);
        };
        if conversation.push_message(message) {
            Ok(MessageAppend::Appended)
        } else {
            Ok(MessageAppend::Duplicate)
        }
    }

    async fn set_status(
        &self,
        id: &ConversationId,
        status: ConversationStatus,
    ) -> Result<bool, DomainError> {
        let mut conversations = self.conversations.write().await;
        match conversations.get_mut(id) {
            Some(conversation) => {
                conversation.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get(&self, id: &ConversationId) -> Result<Option<Conversation>, DomainError> {
        Ok(self.conversations.read().await.get(id).cloned())
    }
}

// ============================================
// Contacts
// ============================================

/// Contact list plus notes per contact.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContactStore {
    contacts: Arc<RwLock<HashMap<ContactId, Contact>>>,
    notes: Arc<RwLock<HashMap<ContactId, Vec<ContactNote>>>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &ContactId) -> Option<Contact> {
        self.contacts.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.contacts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.contacts.read().await.is_empty()
    }

    /// Notes for a contact, oldest first.
    pub async fn notes_for(&self, id: &ContactId) -> Vec<ContactNote> {
        self.notes.read().await.get(id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn on_created(&self, contact: Contact) -> Result<(), DomainError> {
        self.contacts
            .write()
            .await
            .insert(contact.id.clone(), contact);
        Ok(())
    }

    async fn on_updated(&self, contact: Contact) -> Result<(), DomainError> {
        // Updates for contacts not yet listed insert them.
        self.on_created(contact).await
    }

    async fn on_deleted(&self, id: &ContactId) -> Result<bool, DomainError> {
        self.notes.write().await.remove(id);
        Ok(self.contacts.write().await.remove(id).is_some())
    }

    async fn on_note_created(&self, note: ContactNote) -> Result<(), DomainError> {
        let mut notes = self.notes.write().await;
        let entry = notes.entry(note.contact_id.clone()).or_default();
        if !entry.iter().any(|n| n.id == note.id) {
            entry.push(note);
        }
        Ok(())
    }
}

// ============================================
// Inboxes
// ============================================

#[derive(Debug, Clone, Default)]
pub struct InMemoryInboxStore {
    inboxes: Arc<RwLock<HashMap<InboxId, Inbox>>>,
}

impl InMemoryInboxStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &InboxId) -> Option<Inbox> {
        self.inboxes.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inboxes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inboxes.read().await.is_empty()
    }
}

#[async_trait]
impl InboxStore for InMemoryInboxStore {
    async fn on_created(&self, inbox: Inbox) -> Result<(), DomainError> {
        self.inboxes.write().await.insert(inbox.id.clone(), inbox);
        Ok(())
    }

    async fn on_updated(&self, inbox: Inbox) -> Result<(), DomainError> {
        self.inboxes.write().await.insert(inbox.id.clone(), inbox);
        Ok(())
    }
}

// ============================================
// Account
// ============================================

/// The signed-in user's account state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    company: Arc<RwLock<Option<Company>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn company(&self) -> Option<Company> {
        self.company.read().await.clone()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn update_user(&self, patch: UserPatch) -> Result<(), DomainError> {
        if let Some(company) = patch.company {
            *self.company.write().await = Some(company);
        }
        Ok(())
    }
}
