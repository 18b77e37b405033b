//! インメモリ実装

pub mod connection_registry;
pub mod message_store;

pub use connection_registry::InMemoryConnectionRegistry;
pub use message_store::InMemoryMessageStore;
