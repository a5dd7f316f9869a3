//! InboxStore port - Inboxes visible to the signed-in agent.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::inbox::Inbox;

/// Port for the inbox store.
#[async_trait]
pub trait InboxStore: Send + Sync {
    async fn on_created(&self, inbox: Inbox) -> Result<(), DomainError>;

    async fn on_updated(&self, inbox: Inbox) -> Result<(), DomainError>;
}
