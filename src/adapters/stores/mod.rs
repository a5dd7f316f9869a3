//! Store adapters.

mod in_memory;

pub use in_memory::{
    InMemoryAccountStore, InMemoryContactStore, InMemoryConversationStore, InMemoryInboxStore,
};
