//! UseCase: セッション接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase::execute() メソッド
//! - 接続の登録と、ルーム履歴の再生（replay）
//!
//! ### なぜこのテストが必要か
//! - 新しく参加した接続は、ライブ配信より先にルームの全履歴を受け取る必要がある
//! - 履歴の取得に失敗した接続が Registry に残ってはいけない
//!
//! ### どのような状況を想定しているか
//! - 正常系：履歴のあるルームへの接続
//! - 異常系：Message Store の障害、二重登録、Closed セッションの再接続
//! - エッジケース：他ルームの履歴が混ざらないこと

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, MessageStore, Session, formatter};

use super::{error::ConnectError, room_locks::RoomLocks};

/// セッション接続のユースケース
pub struct ConnectSessionUseCase {
    /// 接続中のクライアント一覧
    registry: Arc<dyn ConnectionRegistry>,
    /// メッセージ履歴の保存先
    store: Arc<dyn MessageStore>,
    /// ルーム単位の直列化ロック
    room_locks: Arc<RoomLocks>,
}

impl ConnectSessionUseCase {
    /// 新しい ConnectSessionUseCase を作成
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        store: Arc<dyn MessageStore>,
        room_locks: Arc<RoomLocks>,
    ) -> Self {
        Self {
            registry,
            store,
            room_locks,
        }
    }

    /// 接続を実行
    ///
    /// ルームのロックを保持したまま、登録と履歴の再生を行います。
    /// そのため再生中の接続に同じルームのライブメッセージが先に届くことはありません。
    ///
    /// # Arguments
    ///
    /// * `session` - Connecting 状態のセッション（トランスポートのハンドシェイク完了済み）
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 再生したメッセージ数
    /// * `Err(ConnectError)` - 接続失敗。セッションは Closed になり、Registry には残らない
    pub async fn execute(&self, session: &mut Session) -> Result<usize, ConnectError> {
        let context = session.context();
        let connection = session.connection().clone();

        let _room_guard = self.room_locks.lock(context.room_id).await;

        // 1. Connecting -> Active
        session.activate()?;

        // 2. Registry に登録
        if let Err(e) = self.registry.register(connection.clone(), context).await {
            tracing::error!("Lifecycle invariant broken: {}", e);
            session.close();
            return Err(e.into());
        }

        // 3. 履歴をすべて取得してから再生する（部分的な再生はしない）
        let history = match self.store.list_by_room(context.room_id).await {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(
                    "Failed to load history of room {} for connection {}: {}",
                    context.room_id,
                    connection.id(),
                    e
                );
                self.registry.unregister(connection.id()).await;
                session.close();
                return Err(ConnectError::HistoryUnavailable(e));
            }
        };

        let mut replayed = 0;
        for message in &history {
            if connection
                .send_text(formatter::render(message, context.user_id))
                .is_err()
            {
                tracing::debug!(
                    "Connection {} closed during history replay",
                    connection.id()
                );
                break;
            }
            replayed += 1;
        }

        tracing::info!(
            "Connection {} joined room {} as user {} ({} messages replayed)",
            connection.id(),
            context.room_id,
            context.user_id,
            replayed
        );
        Ok(replayed)
    }
}
