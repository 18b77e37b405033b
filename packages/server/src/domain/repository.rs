//! Repository traits
//!
//! ドメイン層が必要とするデータアクセスの抽象。
//! 具体的な実装は infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    ChatMessage, ChatRoom, ConnectionId, MessageContent, RoomId, RoomName, SessionContext, UserId,
    connection::Connection,
    error::{RegistryError, StoreError},
};

/// Durable append-only log of chat messages, grouped by room.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message. `created_at` is assigned by the store.
    async fn append(
        &self,
        room_id: RoomId,
        user_id: UserId,
        content: MessageContent,
    ) -> Result<ChatMessage, StoreError>;

    /// All messages of a room, oldest first.
    async fn list_by_room(&self, room_id: RoomId) -> Result<Vec<ChatMessage>, StoreError>;

    async fn create_room(&self, name: RoomName) -> Result<ChatRoom, StoreError>;

    async fn find_room(&self, room_id: RoomId) -> Result<Option<ChatRoom>, StoreError>;
}

/// Process-wide table of live connections and their session context.
///
/// Implementations must be safe to call concurrently from every connection
/// task.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// # Errors
    ///
    /// `RegistryError::DuplicateConnection` if the connection is already registered
    async fn register(
        &self,
        connection: Connection,
        context: SessionContext,
    ) -> Result<(), RegistryError>;

    /// # Errors
    ///
    /// `RegistryError::UnknownConnection` if the connection is not registered
    async fn lookup(&self, connection_id: &ConnectionId) -> Result<SessionContext, RegistryError>;

    /// Idempotent. Returns whether an entry was removed.
    async fn unregister(&self, connection_id: &ConnectionId) -> bool;

    /// Snapshot of the connections currently in `room_id`.
    async fn all_in_room(&self, room_id: RoomId) -> Vec<(Connection, SessionContext)>;

    async fn count_in_room(&self, room_id: RoomId) -> usize;

    async fn count(&self) -> usize;
}
