//! WebSocket transport adapters.
//!
//! The client keeps one persistent connection per session and hides its
//! reconnects from callers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐   commands    ┌─────────────────────────────┐
//! │ Transport (handle)   │ ────────────► │ Worker task                 │
//! │  connect/send/...    │               │  socket, subscriptions,     │
//! └──────────────────────┘ ◄──────────── │  outbox, retry timer        │
//!                            status      └─────────────────────────────┘
//!                                              │ frames      ▲ Socket
//!                                              ▼             │
//!                                        EventRouter     Connector
//!                                                  (Tungstenite | Memory)
//! ```
//!
//! # Components
//!
//! - [`transport`] - Connection lifecycle, replay and outbox
//! - [`connector`] - tokio-tungstenite socket adapter
//! - [`memory`] - In-process socket for tests and local runs

pub mod connector;
pub mod memory;
pub mod transport;

pub use connector::TungsteniteConnector;
pub use memory::{MemoryConnector, MemoryPeer};
pub use transport::{Transport, TransportOptions};
