//! Domain layer containing the realtime client's types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, errors, state machine)
//! - `realtime` - Wire protocol, topics, connection lifecycle, backoff
//! - `conversation` - Conversations and chat messages
//! - `contact` - Contacts and contact notes
//! - `inbox` - Inboxes
//! - `account` - Tenant company and user patches

pub mod account;
pub mod contact;
pub mod conversation;
pub mod foundation;
pub mod inbox;
pub mod realtime;
