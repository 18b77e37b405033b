//! UseCase: メッセージのブロードキャスト処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - BroadcastMessageUseCase::execute() メソッド
//! - 永続化してから配信すること、閲覧者ごとの描画、ルーム単位の順序保証
//!
//! ### なぜこのテストが必要か
//! - 永続化されていないメッセージが誰かに届いてはいけない
//! - 送信者自身にも "Me > " として届く（クライアント側でローカルエコーしない）
//! - 切断済みの接続があっても他の参加者への配信は止まらない
//!
//! ### どのような状況を想定しているか
//! - 正常系：同じルームの 2 人へのブロードキャスト
//! - 異常系：Message Store の障害、未登録の送信元
//! - エッジケース：配信直前に閉じた接続、切断済みの接続、同一ルームへの並行送信

use std::sync::Arc;

use crate::domain::{
    ChatMessage, ConnectionId, ConnectionRegistry, MessageContent, MessageStore, formatter,
};

use super::{error::BroadcastError, room_locks::RoomLocks};

/// ブロードキャストの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    /// 永続化されたメッセージ
    pub message: ChatMessage,
    /// 配信できた接続数（送信者自身を含む）
    pub delivered: usize,
    /// スナップショット取得後に閉じていた接続数
    pub stale: usize,
}

/// メッセージブロードキャストのユースケース
#[derive(Clone)]
pub struct BroadcastMessageUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    store: Arc<dyn MessageStore>,
    room_locks: Arc<RoomLocks>,
}

impl BroadcastMessageUseCase {
    /// 新しい BroadcastMessageUseCase を作成
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

    /// ブロードキャストを実行
    ///
    /// 永続化と配信はルームのロックを保持したまま 1 つの単位として行うため、
    /// 同じルームのメンバーには永続化された順にメッセージが届きます。
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 送信元の接続
    /// * `content` - メッセージ内容（Domain Model）
    ///
    /// # Returns
    ///
    /// * `Ok(BroadcastReport)` - 永続化と配信の結果
    /// * `Err(BroadcastError)` - 失敗。この場合、誰にも配信されていない
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        content: MessageContent,
    ) -> Result<BroadcastReport, BroadcastError> {
        // 1. 送信元のセッションコンテキストを取得
        let context = self.registry.lookup(connection_id).await?;

        let _room_guard = self.room_locks.lock(context.room_id).await;

        // 2. 永続化（失敗したら配信しない）
        let message = self
            .store
            .append(context.room_id, context.user_id, content)
            .await
            .map_err(BroadcastError::Persistence)?;

        // 3. ルームの全接続へ、各受信者の視点で配信（送信者自身を含む）
        let recipients = self.registry.all_in_room(context.room_id).await;
        let mut delivered = 0;
        let mut stale = 0;
        for (recipient, recipient_context) in recipients {
            let line = formatter::render(&message, recipient_context.user_id);
            // 4. 閉じた接続への配信失敗はその接続だけの問題として無視する
            match recipient.send_text(line) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::debug!("Skipping stale recipient: {}", e);
                    stale += 1;
                }
            }
        }

        tracing::info!(
            "Broadcast message {} from user {} in room {} to {} connection(s) ({} stale)",
            message.id,
            context.user_id,
            context.room_id,
            delivered,
            stale
        );

        Ok(BroadcastReport {
            message,
            delivered,
            stale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            ChatRoom, Connection, MockMessageStore, RegistryError, RoomId, RoomName,
            SessionContext, StoreError, UserId,
        },
        infrastructure::repository::{InMemoryConnectionRegistry, InMemoryMessageStore},
    };
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Fixture {
        registry: Arc<InMemoryConnectionRegistry>,
        store: Arc<InMemoryMessageStore>,
        room_locks: Arc<RoomLocks>,
        usecase: BroadcastMessageUseCase,
    }

    /// ルームを 2 つ（ID 1, 2）作成済みの環境
    async fn create_fixture() -> Fixture {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let store = Arc::new(InMemoryMessageStore::new());
        for name in ["lobby", "random"] {
            store
                .create_room(RoomName::new(name.to_string()).unwrap())
                .await
                .unwrap();
        }
        let room_locks = Arc::new(RoomLocks::new());
        let usecase =
            BroadcastMessageUseCase::new(registry.clone(), store.clone(), room_locks.clone());
        Fixture {
            registry,
            store,
            room_locks,
            usecase,
        }
    }

    async fn join(
        registry: &InMemoryConnectionRegistry,
        room_id: i64,
        user_id: i64,
    ) -> (ConnectionId, UnboundedReceiver<String>) {
        let (connection, rx) = Connection::channel();
        let connection_id = *connection.id();
        let context = SessionContext::new(
            RoomId::new(room_id).unwrap(),
            UserId::new(user_id).unwrap(),
        );
        registry.register(connection, context).await.unwrap();
        (connection_id, rx)
    }

    fn content(text: &str) -> MessageContent {
        MessageContent::new(text.to_string()).unwrap()
    }

    fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn test_broadcast_renders_per_recipient_and_persists_once() {
        // テスト項目: ユーザー 10 の "hi" が 10 には "Me > hi"、20 には "Friend > hi" で届き、1 件だけ永続化される
        // given (前提条件):
        let fixture = create_fixture().await;
        let (alice, mut alice_rx) = join(&fixture.registry, 1, 10).await;
        let (_bob, mut bob_rx) = join(&fixture.registry, 1, 20).await;

        // when (操作):
        let report = fixture.usecase.execute(&alice, content("hi")).await.unwrap();

        // then (期待する結果):
        assert_eq!(drain(&mut alice_rx), vec!["Me > hi"]);
        assert_eq!(drain(&mut bob_rx), vec!["Friend > hi"]);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.stale, 0);

        let history = fixture
            .store
            .list_by_room(RoomId::new(1).unwrap())
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].room_id.value(), 1);
        assert_eq!(history[0].user_id.value(), 10);
        assert_eq!(history[0].content.as_str(), "hi");
        assert_eq!(report.message, history[0]);
    }

    #[tokio::test]
    async fn test_broadcast_does_not_leak_to_other_rooms() {
        // テスト項目: 別ルームの接続にはメッセージが届かない
        // given (前提条件):
        let fixture = create_fixture().await;
        let (alice, _alice_rx) = join(&fixture.registry, 1, 10).await;
        let (_carol, mut carol_rx) = join(&fixture.registry, 2, 30).await;

        // when (操作):
        fixture.usecase.execute(&alice, content("hi")).await.unwrap();

        // then (期待する結果):
        assert!(drain(&mut carol_rx).is_empty());
        assert!(
            fixture
                .store
                .list_by_room(RoomId::new(2).unwrap())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_broadcast_store_failure_delivers_nothing() {
        // テスト項目: 永続化に失敗した場合、送信者を含め誰にも配信されない
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let (alice, mut alice_rx) = join(&registry, 1, 10).await;
        let (_bob, mut bob_rx) = join(&registry, 1, 20).await;
        let mut store = MockMessageStore::new();
        store
            .expect_append()
            .times(1)
            .returning(|_, _, _| Err(StoreError::Unavailable("database is down".to_string())));
        let usecase = BroadcastMessageUseCase::new(
            registry.clone(),
            Arc::new(store),
            Arc::new(RoomLocks::new()),
        );

        // when (操作):
        let result = usecase.execute(&alice, content("hi")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(BroadcastError::Persistence(StoreError::Unavailable(
                "database is down".to_string()
            )))
        );
        assert!(drain(&mut alice_rx).is_empty());
        assert!(drain(&mut bob_rx).is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_from_unknown_connection_fails_without_persisting() {
        // テスト項目: 未登録の接続からのブロードキャストは UnknownConnection になり、永続化もされない
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store.expect_append().never();
        let usecase = BroadcastMessageUseCase::new(
            Arc::new(InMemoryConnectionRegistry::new()),
            Arc::new(store),
            Arc::new(RoomLocks::new()),
        );
        let (ghost, _rx) = Connection::channel();

        // when (操作):
        let result = usecase.execute(ghost.id(), content("boo")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(BroadcastError::UnknownConnection(
                RegistryError::UnknownConnection(*ghost.id())
            ))
        );
    }

    #[tokio::test]
    async fn test_broadcast_skips_stale_recipient() {
        // テスト項目: 閉じた接続への配信失敗は無視され、他の参加者には届く
        // given (前提条件):
        let fixture = create_fixture().await;
        let (alice, mut alice_rx) = join(&fixture.registry, 1, 10).await;
        let (_bob, bob_rx) = join(&fixture.registry, 1, 20).await;
        let (_carol, mut carol_rx) = join(&fixture.registry, 1, 30).await;
        drop(bob_rx); // bob の接続は閉じたが、まだ Registry に残っている

        // when (操作):
        let report = fixture.usecase.execute(&alice, content("hi")).await.unwrap();

        // then (期待する結果):
        assert_eq!(report.delivered, 2);
        assert_eq!(report.stale, 1);
        assert_eq!(drain(&mut alice_rx), vec!["Me > hi"]);
        assert_eq!(drain(&mut carol_rx), vec!["Friend > hi"]);
    }

    #[tokio::test]
    async fn test_broadcast_after_disconnect_skips_removed_connection() {
        // テスト項目: 切断（unregister）された接続には配信を試みず、エラーにもならない
        // given (前提条件):
        let fixture = create_fixture().await;
        let (alice, mut alice_rx) = join(&fixture.registry, 1, 10).await;
        let (bob, mut bob_rx) = join(&fixture.registry, 1, 20).await;
        fixture.registry.unregister(&alice).await;

        // when (操作):
        let report = fixture.usecase.execute(&bob, content("anyone?")).await.unwrap();

        // then (期待する結果):
        assert_eq!(report.delivered, 1);
        assert_eq!(report.stale, 0);
        assert!(drain(&mut alice_rx).is_empty());
        assert_eq!(drain(&mut bob_rx), vec!["Me > anyone?"]);
    }

    /// 追記の前後で処理を譲る Message Store（並行実行時の割り込みを起こしやすくする）
    struct YieldingStore {
        inner: InMemoryMessageStore,
    }

    #[async_trait]
    impl MessageStore for YieldingStore {
        async fn append(
            &self,
            room_id: RoomId,
            user_id: UserId,
            content: MessageContent,
        ) -> Result<ChatMessage, StoreError> {
            tokio::task::yield_now().await;
            let message = self.inner.append(room_id, user_id, content).await;
            tokio::task::yield_now().await;
            message
        }

        async fn list_by_room(&self, room_id: RoomId) -> Result<Vec<ChatMessage>, StoreError> {
            self.inner.list_by_room(room_id).await
        }

        async fn create_room(&self, name: RoomName) -> Result<ChatRoom, StoreError> {
            self.inner.create_room(name).await
        }

        async fn find_room(&self, room_id: RoomId) -> Result<Option<ChatRoom>, StoreError> {
            self.inner.find_room(room_id).await
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_broadcasts_arrive_in_persistence_order() {
        // テスト項目: 同じルームへの並行ブロードキャストが、全員に永続化順で届く
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let store = Arc::new(YieldingStore {
            inner: InMemoryMessageStore::new(),
        });
        store
            .create_room(RoomName::new("lobby".to_string()).unwrap())
            .await
            .unwrap();
        let usecase = Arc::new(BroadcastMessageUseCase::new(
            registry.clone(),
            store.clone(),
            Arc::new(RoomLocks::new()),
        ));
        let mut senders = Vec::new();
        let mut receivers = Vec::new();
        for user_id in 1..=4 {
            let (connection_id, rx) = join(&registry, 1, user_id).await;
            senders.push(connection_id);
            receivers.push(rx);
        }

        // when (操作): 4 人がそれぞれ 25 件を同時に送信
        let mut handles = Vec::new();
        for (n, sender) in senders.iter().copied().enumerate() {
            let usecase = usecase.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    usecase
                        .execute(&sender, content(&format!("{n}-{i}")))
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // then (期待する結果): 各受信者が見た順序 = 履歴の順序
        let history: Vec<String> = store
            .list_by_room(RoomId::new(1).unwrap())
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content.into_string())
            .collect();
        assert_eq!(history.len(), 100);
        for rx in receivers.iter_mut() {
            let seen: Vec<String> = drain(rx)
                .into_iter()
                .map(|line| {
                    line.split_once(" > ")
                        .map(|(_, body)| body.to_string())
                        .unwrap()
                })
                .collect();
            assert_eq!(seen, history);
        }
    }

    #[tokio::test]
    async fn test_busy_room_does_not_block_other_rooms() {
        // テスト項目: あるルームのロックが保持されていても、別ルームのブロードキャストは完了する
        // given (前提条件):
        let fixture = create_fixture().await;
        let (_alice, _alice_rx) = join(&fixture.registry, 1, 10).await;
        let (carol, mut carol_rx) = join(&fixture.registry, 2, 30).await;
        let _busy = fixture.room_locks.lock(RoomId::new(1).unwrap()).await;

        // when (操作):
        let result = tokio::time::timeout(
            Duration::from_secs(1),
            fixture.usecase.execute(&carol, content("still here")),
        )
        .await;

        // then (期待する結果):
        assert!(matches!(result, Ok(Ok(_))));
        assert_eq!(drain(&mut carol_rx), vec!["Me > still here"]);
    }
}
