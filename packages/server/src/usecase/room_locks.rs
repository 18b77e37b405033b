//! 同一ルーム内の処理を直列化するためのロック
//!
//! ルームごとに非同期 Mutex を 1 つ持ちます。
//! 異なるルームは別のロックを使うため、互いに待ち合わせません。

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::RoomId;

/// ルーム単位のロック表
#[derive(Default)]
pub struct RoomLocks {
    locks: Mutex<HashMap<RoomId, Arc<Mutex<()>>>>,
}

impl RoomLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// `room_id` のロックを取得する。ガードを破棄すると解放される。
    pub async fn lock(&self, room_id: RoomId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(room_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}
