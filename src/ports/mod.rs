//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the realtime core and the outside world. Adapters implement these ports.
//!
//! ## Connection Ports
//!
//! - `Connector` - Opens the raw socket the transport runs over
//!
//! ## Event Ports
//!
//! - `EventHandler` - Handler that processes inbound events
//! - `EventSubscriber` - Registration of handlers per event kind
//!
//! ## Store Ports
//!
//! External state the UI renders from. Each domain handler writes to
//! exactly one of these.
//!
//! - `ConversationStore`, `ContactStore`, `InboxStore`, `AccountStore`

mod account_store;
mod connector;
mod contact_store;
mod conversation_store;
mod event_subscriber;
mod inbox_store;

pub use account_store::AccountStore;
pub use connector::{Connector, FrameSink, FrameStream, Socket, TransportError};
pub use contact_store::ContactStore;
pub use conversation_store::{ConversationStore, MessageAppend};
pub use event_subscriber::{EventHandler, EventSubscriber};
pub use inbox_store::InboxStore;
