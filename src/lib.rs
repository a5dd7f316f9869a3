//! Realtime messaging client for the support chat widget and agent portal.
//!
//! Keeps one persistent WebSocket connection per session, reconnects with
//! capped exponential backoff, replays topic subscriptions after every
//! reconnect, and routes validated inbound events to per-store handlers.
//!
//! # Layers
//!
//! - [`domain`] - Protocol types, topics, connection lifecycle, backoff
//! - [`ports`] - Connector, handler and store interfaces
//! - [`adapters`] - Router, transport worker, socket connectors, in-memory stores
//! - [`application`] - Domain handlers, outbound API, session wiring
//! - [`config`] - Environment-driven configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

pub use application::{RealtimeApi, RealtimeSession, StoreSet};
