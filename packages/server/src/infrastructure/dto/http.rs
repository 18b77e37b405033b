//! HTTP API request/response DTOs for the chat application.

use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, ChatRoom};

/// Request body for room creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
}

/// Room as returned right after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDto {
    pub id: i64,
    pub name: String,
}

impl From<&ChatRoom> for RoomDto {
    fn from(room: &ChatRoom) -> Self {
        Self {
            id: room.id.value(),
            name: room.name.as_str().to_string(),
        }
    }
}

/// Room detail for detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: i64,
    pub name: String,
    /// Number of live WebSocket connections in the room
    pub connections: usize,
}

/// Stored chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageDto {
    pub id: i64,
    pub room_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: String, // ISO 8601
}

impl From<&ChatMessage> for ChatMessageDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id.value(),
            room_id: message.room_id.value(),
            user_id: message.user_id.value(),
            content: message.content.as_str().to_string(),
            created_at: roomcast_shared::time::timestamp_to_jst_rfc3339(
                message.created_at.value(),
            ),
        }
    }
}
