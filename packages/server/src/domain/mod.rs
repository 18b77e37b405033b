//! Domain layer for the chat application.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod connection;
pub mod entity;
pub mod error;
pub mod factory;
pub mod formatter;
pub mod repository;
pub mod session;
pub mod value_object;

pub use connection::Connection;
pub use entity::{ChatMessage, ChatRoom, SessionContext};
pub use error::{ConnectionError, RegistryError, SessionError, StoreError, ValueObjectError};
pub use factory::ConnectionIdFactory;
pub use repository::{ConnectionRegistry, MessageStore};
pub use session::{Session, SessionState};
pub use value_object::{
    ConnectionId, MessageContent, MessageId, RoomId, RoomName, Timestamp, UserId,
};

#[cfg(test)]
pub use repository::MockMessageStore;
