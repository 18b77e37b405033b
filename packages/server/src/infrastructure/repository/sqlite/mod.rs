//! SQLite による永続化

pub mod message_store;

pub use message_store::SqliteMessageStore;
