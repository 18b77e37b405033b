//! UseCase: セッション切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectSessionUseCase::execute() メソッド
//! - Registry からの削除と Closed への遷移
//!
//! ### なぜこのテストが必要か
//! - 切断した接続が Registry に残ると、以降のブロードキャストが無駄な配信を試みる
//! - 切断はブロードキャストや永続化の失敗に左右されず、必ず完了しなければならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：Active なセッションの切断
//! - エッジケース：二重の切断、ルームのロックが保持されている最中の切断

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, Session};

/// セッション切断のユースケース
pub struct DisconnectSessionUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl DisconnectSessionUseCase {
    /// 新しい DisconnectSessionUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 切断を実行
    ///
    /// ルームのロックは取得しないため、同じルームでブロードキャスト中でも待たされません。
    /// 何度呼んでもよく、失敗しません。
    ///
    /// # Returns
    ///
    /// Registry からエントリを削除した場合は `true`
    pub async fn execute(&self, session: &mut Session) -> bool {
        session.close();
        let connection_id = session.connection().id();
        let removed = self.registry.unregister(connection_id).await;
        if removed {
            let context = session.context();
            tracing::info!(
                "Connection {} (user {}) left room {}",
                connection_id,
                context.user_id,
                context.room_id
            );
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Connection, RoomId, SessionContext, SessionState, UserId},
        infrastructure::repository::InMemoryConnectionRegistry,
        usecase::RoomLocks,
    };
    use std::time::Duration;

    fn new_session(room_id: i64, user_id: i64) -> Session {
        let (connection, _rx) = Connection::channel();
        let context = SessionContext::new(
            RoomId::new(room_id).unwrap(),
            UserId::new(user_id).unwrap(),
        );
        Session::new(connection, context)
    }

    async fn activate(registry: &InMemoryConnectionRegistry, session: &mut Session) {
        session.activate().unwrap();
        registry
            .register(session.connection().clone(), session.context())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_disconnect_removes_from_room() {
        // テスト項目: 切断すると all_in_room から消え、セッションは Closed になる
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let usecase = DisconnectSessionUseCase::new(registry.clone());
        let mut alice = new_session(1, 10);
        let mut bob = new_session(1, 20);
        activate(&registry, &mut alice).await;
        activate(&registry, &mut bob).await;

        // when (操作):
        let removed = usecase.execute(&mut alice).await;

        // then (期待する結果):
        assert!(removed);
        assert_eq!(alice.state(), SessionState::Closed);
        let members = registry.all_in_room(RoomId::new(1).unwrap()).await;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].0.id(), bob.connection().id());
    }

    #[tokio::test]
    async fn test_disconnect_twice_is_harmless() {
        // テスト項目: 2 回目の切断は何もせず、エラーにもならない
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let usecase = DisconnectSessionUseCase::new(registry.clone());
        let mut alice = new_session(1, 10);
        activate(&registry, &mut alice).await;

        // when (操作):
        let first = usecase.execute(&mut alice).await;
        let second = usecase.execute(&mut alice).await;

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_disconnect_never_registered_session() {
        // テスト項目: 登録前（Connecting）のセッションも切断できる
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let usecase = DisconnectSessionUseCase::new(registry.clone());
        let mut session = new_session(1, 10);

        // when (操作):
        let removed = usecase.execute(&mut session).await;

        // then (期待する結果):
        assert!(!removed);
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_disconnect_is_not_blocked_by_busy_room() {
        // テスト項目: ルームのロックが保持されていても切断は完了する
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let usecase = DisconnectSessionUseCase::new(registry.clone());
        let room_locks = RoomLocks::new();
        let mut alice = new_session(1, 10);
        activate(&registry, &mut alice).await;
        let _busy = room_locks.lock(RoomId::new(1).unwrap()).await;

        // when (操作):
        let result =
            tokio::time::timeout(Duration::from_secs(1), usecase.execute(&mut alice)).await;

        // then (期待する結果):
        assert!(matches!(result, Ok(true)));
    }
}
