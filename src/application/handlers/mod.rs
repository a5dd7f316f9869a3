//! Domain event handlers.
//!
//! One handler per store. Each handler owns exactly one store and only
//! ever writes to it.

mod company_events;
mod contact_events;
mod conversation_events;
mod inbox_events;

pub use company_events::CompanyEventHandler;
pub use contact_events::ContactEventHandler;
pub use conversation_events::ConversationEventHandler;
pub use inbox_events::InboxEventHandler;
