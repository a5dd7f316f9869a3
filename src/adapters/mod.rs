//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the realtime core to external systems:
//! - `events` - Event router (handler registry and dispatch)
//! - `stores` - In-memory store implementations
//! - `websocket` - Socket connectors and the transport worker

pub mod events;
pub mod stores;
pub mod websocket;

pub use events::{DispatchOutcome, EventRouter};
pub use stores::{
    InMemoryAccountStore, InMemoryContactStore, InMemoryConversationStore, InMemoryInboxStore,
};
pub use websocket::{
    MemoryConnector, MemoryPeer, Transport, TransportOptions, TungsteniteConnector,
};
