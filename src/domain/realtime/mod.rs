//! Realtime protocol domain.
//!
//! Pure types for the persistent connection: the wire envelope, typed
//! inbound/outbound events, topics, connection identity and lifecycle,
//! the reconnect policy and the subscription set. No I/O lives here.

mod backoff;
mod connection;
mod envelope;
mod events;
mod subscriptions;
mod topic;

pub use backoff::ReconnectPolicy;
pub use connection::{
    ConnectionState, ConnectionStatus, Role, SessionIdentity, QUERY_ID, QUERY_ROLE, QUERY_TENANT,
};
pub use envelope::{DecodeError, Envelope};
pub use events::{Delivery, EventKind, InboundEvent, OutboundEvent};
pub use subscriptions::SubscriptionSet;
pub use topic::Topic;
