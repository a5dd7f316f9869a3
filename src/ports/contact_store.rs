//! ContactStore port - The agent portal's contact list.

use async_trait::async_trait;

use crate::domain::contact::{Contact, ContactNote};
use crate::domain::foundation::{ContactId, DomainError};

/// Port for the contact store.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn on_created(&self, contact: Contact) -> Result<(), DomainError>;

    async fn on_updated(&self, contact: Contact) -> Result<(), DomainError>;

    /// Remove a contact. Returns false if it was not present.
    async fn on_deleted(&self, id: &ContactId) -> Result<bool, DomainError>;

    async fn on_note_created(&self, note: ContactNote) -> Result<(), DomainError>;
}
