//! Application layer - Handlers, outbound API and session wiring.
//!
//! - `handlers` - Domain event handlers, one per store
//! - `outbound` - Typed fire-and-forget requests
//! - `session` - The top-level owner tying router, transport and API together

pub mod handlers;
pub mod outbound;
pub mod session;

pub use handlers::{
    CompanyEventHandler, ContactEventHandler, ConversationEventHandler, InboxEventHandler,
};
pub use outbound::RealtimeApi;
pub use session::{RealtimeSession, StoreSet};
