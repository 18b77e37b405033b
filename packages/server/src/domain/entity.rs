//! Core domain models for the chat application.

use serde::{Deserialize, Serialize};

use super::value_object::{MessageContent, MessageId, RoomId, RoomName, Timestamp, UserId};

/// Represents a chat room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoom {
    /// Room identifier
    pub id: RoomId,
    /// Display name
    pub name: RoomName,
}

impl ChatRoom {
    /// Create a new chat room
    pub fn new(id: RoomId, name: RoomName) -> Self {
        Self { id, name }
    }
}

/// Represents a persisted chat message
///
/// Messages are immutable once the store has assigned their id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Identifier assigned by the message store
    pub id: MessageId,
    /// Room the message was posted in
    pub room_id: RoomId,
    /// Author
    pub user_id: UserId,
    /// Message content
    pub content: MessageContent,
    /// Creation time, the ordering key for room history
    pub created_at: Timestamp,
}

impl ChatMessage {
    /// Create a new chat message
    pub fn new(
        id: MessageId,
        room_id: RoomId,
        user_id: UserId,
        content: MessageContent,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            room_id,
            user_id,
            content,
            created_at,
        }
    }

    /// Whether `viewer` wrote this message
    pub fn is_authored_by(&self, viewer: UserId) -> bool {
        self.user_id == viewer
    }
}

/// The (room, user) binding attached to one live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionContext {
    pub room_id: RoomId,
    pub user_id: UserId,
}

impl SessionContext {
    pub fn new(room_id: RoomId, user_id: UserId) -> Self {
        Self { room_id, user_id }
    }
}
