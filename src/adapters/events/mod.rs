//! Event routing adapters.
//!
//! - `EventRouter` - Registry of inbound handlers and the dispatch boundary

mod router;

pub use router::{DispatchOutcome, EventRouter};
