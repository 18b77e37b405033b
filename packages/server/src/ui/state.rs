//! Server state and connection management.

use serde::Deserialize;
use std::sync::Arc;

use crate::{
    domain::{ConnectionRegistry, MessageStore},
    infrastructure::repository::InMemoryConnectionRegistry,
    usecase::{
        BroadcastMessageUseCase, ConnectSessionUseCase, DisconnectSessionUseCase, RoomLocks,
    },
};

/// Query parameters for WebSocket connection
///
/// `user_id` is supplied by the upstream authorization layer and trusted as is.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub user_id: i64,
}

/// Shared application state
///
/// Created once at server start and dropped when the server stops.
pub struct AppState {
    /// 接続中のクライアント一覧
    pub registry: Arc<dyn ConnectionRegistry>,
    /// メッセージ履歴とルームの保存先
    pub store: Arc<dyn MessageStore>,
    /// ルーム単位の直列化ロック
    pub room_locks: Arc<RoomLocks>,
}

impl AppState {
    /// Build the state around `store` with an empty in-memory registry
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self {
            registry: Arc::new(InMemoryConnectionRegistry::new()),
            store,
            room_locks: Arc::new(RoomLocks::new()),
        }
    }

    pub fn connect_usecase(&self) -> ConnectSessionUseCase {
        ConnectSessionUseCase::new(
            self.registry.clone(),
            self.store.clone(),
            self.room_locks.clone(),
        )
    }

    pub fn broadcast_usecase(&self) -> BroadcastMessageUseCase {
        BroadcastMessageUseCase::new(
            self.registry.clone(),
            self.store.clone(),
            self.room_locks.clone(),
        )
    }

    pub fn disconnect_usecase(&self) -> DisconnectSessionUseCase {
        DisconnectSessionUseCase::new(self.registry.clone())
    }
}
