//! InMemory Message Store 実装
//!
//! ドメイン層が定義する MessageStore trait の具体的な実装。
//! データベースを設定しない場合のデフォルトの保存先です。
//! プロセス終了とともに履歴は失われます。

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, ChatRoom, MessageContent, MessageId, MessageStore, RoomId, RoomName, StoreError,
    Timestamp, UserId,
};

#[derive(Default)]
struct StoreState {
    rooms: BTreeMap<RoomId, ChatRoom>,
    messages: Vec<ChatMessage>,
    last_room_id: i64,
    last_message_id: i64,
    last_created_at: i64,
}

/// インメモリ Message Store 実装
///
/// `created_at` は狭義単調増加になるよう採番するため（同じミリ秒の追記は 1ms ずつずらす）、
/// 追記順と履歴の並び順が一致します。
#[derive(Default)]
pub struct InMemoryMessageStore {
    state: Mutex<StoreState>,
}

impl InMemoryMessageStore {
    /// 新しい InMemoryMessageStore を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(
        &self,
        room_id: RoomId,
        user_id: UserId,
        content: MessageContent,
    ) -> Result<ChatMessage, StoreError> {
        let mut state = self.state.lock().await;
        if !state.rooms.contains_key(&room_id) {
            return Err(StoreError::Integrity(format!(
                "chat_room {room_id} does not exist"
            )));
        }

        state.last_message_id += 1;
        let created_at = Timestamp::now().value().max(state.last_created_at + 1);
        state.last_created_at = created_at;

        let message = ChatMessage::new(
            MessageId::new(state.last_message_id),
            room_id,
            user_id,
            content,
            Timestamp::new(created_at),
        );
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn list_by_room(&self, room_id: RoomId) -> Result<Vec<ChatMessage>, StoreError> {
        let state = self.state.lock().await;
        let mut messages: Vec<ChatMessage> = state
            .messages
            .iter()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| (m.created_at, m.id));
        Ok(messages)
    }

    async fn create_room(&self, name: RoomName) -> Result<ChatRoom, StoreError> {
        let mut state = self.state.lock().await;
        state.last_room_id += 1;
        let room_id = RoomId::new(state.last_room_id)
            .map_err(|e| StoreError::Integrity(e.to_string()))?;
        let room = ChatRoom::new(room_id, name);
        state.rooms.insert(room_id, room.clone());
        Ok(room)
    }

    async fn find_room(&self, room_id: RoomId) -> Result<Option<ChatRoom>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.rooms.get(&room_id).cloned())
    }
}
