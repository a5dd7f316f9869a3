//! EventSubscriber port - Interface for registering inbound event handlers.
//!
//! Handlers register interest in inbound event kinds without knowing how
//! frames reach the client.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::realtime::{EventKind, InboundEvent};

/// Handler for processing inbound events.
///
/// Implementations should be:
/// - **Quick** - the connection processes one frame at a time
/// - **Isolated** - errors are logged by the router and never reach other handlers
///
/// # Example
///
/// ```ignore
/// struct UnreadCounter { /* ... */ }
///
/// #[async_trait]
/// impl EventHandler for UnreadCounter {
///     async fn handle(&self, event: &InboundEvent) -> Result<(), DomainError> {
///         if let InboundEvent::ConversationSendMessage(message) = event {
///             // bump the badge...
///         }
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "UnreadCounter"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an already-validated event.
    async fn handle(&self, event: &InboundEvent) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for registering handlers per inbound event kind.
///
/// Registration is keyed by handler identity (the `Arc` allocation):
/// registering the same handler twice for one kind is a no-op, and
/// unregistering a handler that is not registered is a no-op.
pub trait EventSubscriber: Send + Sync {
    /// Register a handler for one kind. Returns false if already registered.
    fn register(&self, kind: EventKind, handler: Arc<dyn EventHandler>) -> bool;

    /// Remove a handler for one kind. Returns false if it was not registered.
    fn unregister(&self, kind: EventKind, handler: &Arc<dyn EventHandler>) -> bool;

    /// Register the same handler for several kinds.
    fn register_all(&self, kinds: &[EventKind], handler: Arc<dyn EventHandler>) {
        for kind in kinds {
            self.register(*kind, Arc::clone(&handler));
        }
    }
}
