//! InMemory Connection Registry 実装
//!
//! ドメイン層が定義する ConnectionRegistry trait の具体的な実装。
//! 接続 ID をキーとする HashMap を 1 つの Mutex で保護します。
//! `all_in_room` はロック中にコピーしたスナップショットを返すため、
//! 呼び出し側がイテレート中に他タスクが登録・削除しても影響を受けません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Connection, ConnectionId, ConnectionRegistry, RegistryError, RoomId, SessionContext,
};

/// インメモリ Connection Registry 実装
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    /// 接続中のクライアント（送信チャンネルとセッションコンテキスト）
    connections: Mutex<HashMap<ConnectionId, (Connection, SessionContext)>>,
}

impl InMemoryConnectionRegistry {
    /// 新しい InMemoryConnectionRegistry を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(
        &self,
        connection: Connection,
        context: SessionContext,
    ) -> Result<(), RegistryError> {
        let mut connections = self.connections.lock().await;
        let connection_id = *connection.id();
        if connections.contains_key(&connection_id) {
            return Err(RegistryError::DuplicateConnection(connection_id));
        }
        connections.insert(connection_id, (connection, context));
        Ok(())
    }

    async fn lookup(&self, connection_id: &ConnectionId) -> Result<SessionContext, RegistryError> {
        let connections = self.connections.lock().await;
        connections
            .get(connection_id)
            .map(|(_, context)| *context)
            .ok_or(RegistryError::UnknownConnection(*connection_id))
    }

    async fn unregister(&self, connection_id: &ConnectionId) -> bool {
        let mut connections = self.connections.lock().await;
        connections.remove(connection_id).is_some()
    }

    async fn all_in_room(&self, room_id: RoomId) -> Vec<(Connection, SessionContext)> {
        let connections = self.connections.lock().await;
        connections
            .values()
            .filter(|(_, context)| context.room_id == room_id)
            .cloned()
            .collect()
    }

    async fn count_in_room(&self, room_id: RoomId) -> usize {
        let connections = self.connections.lock().await;
        connections
            .values()
            .filter(|(_, context)| context.room_id == room_id)
            .count()
    }

    async fn count(&self) -> usize {
        let connections = self.connections.lock().await;
        connections.len()
    }
}
