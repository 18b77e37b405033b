//! SQLite Message Store 実装
//!
//! sqlx の SQLite ドライバを使った MessageStore trait の実装。
//! テーブル構成は `chat_room` / `chat_message` の 2 つで、
//! 起動時に `CREATE TABLE IF NOT EXISTS` でスキーマを用意します。

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    Row,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
};

use crate::domain::{
    ChatMessage, ChatRoom, MessageContent, MessageId, MessageStore, RoomId, RoomName, StoreError,
    Timestamp, UserId,
};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS chat_room (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name VARCHAR(30) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS chat_message (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        chat_room_id INTEGER NOT NULL REFERENCES chat_room (id),
        content TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_chat_message_room_created
        ON chat_message (chat_room_id, created_at, id)",
];

/// SQLite Message Store 実装
#[derive(Clone)]
pub struct SqliteMessageStore {
    pool: SqlitePool,
}

impl SqliteMessageStore {
    /// データベースに接続し、スキーマを作成する
    ///
    /// `sqlite::memory:` の場合、接続ごとに別のデータベースになるため
    /// プールの接続数を 1 に固定します。
    ///
    /// # Errors
    ///
    /// 接続またはスキーマ作成に失敗した場合 `StoreError::Unavailable`
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(unavailable)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(unavailable)?;

        let store = Self { pool };
        store.migrate().await?;
        tracing::info!("Connected to SQLite message store at {}", database_url);
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(*statement)
                .execute(&self.pool)
                .await
                .map_err(unavailable)?;
        }
        Ok(())
    }

    fn row_to_message(row: &SqliteRow) -> Result<ChatMessage, StoreError> {
        let id: i64 = row.try_get("id").map_err(integrity)?;
        let room_id: i64 = row.try_get("chat_room_id").map_err(integrity)?;
        let user_id: i64 = row.try_get("user_id").map_err(integrity)?;
        let content: String = row.try_get("content").map_err(integrity)?;
        let created_at: i64 = row.try_get("created_at").map_err(integrity)?;

        Ok(ChatMessage::new(
            MessageId::new(id),
            RoomId::new(room_id).map_err(integrity)?,
            UserId::new(user_id).map_err(integrity)?,
            MessageContent::new(content).map_err(integrity)?,
            Timestamp::new(created_at),
        ))
    }
}

fn unavailable(e: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn integrity(e: impl std::fmt::Display) -> StoreError {
    StoreError::Integrity(e.to_string())
}

/// 制約違反は IntegrityError、それ以外（接続断など）は Unavailable
fn classify(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Database(db) => StoreError::Integrity(db.to_string()),
        other => unavailable(other),
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn append(
        &self,
        room_id: RoomId,
        user_id: UserId,
        content: MessageContent,
    ) -> Result<ChatMessage, StoreError> {
        let created_at = Timestamp::now();
        let result = sqlx::query(
            "INSERT INTO chat_message (user_id, chat_room_id, content, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(user_id.value())
        .bind(room_id.value())
        .bind(content.as_str())
        .bind(created_at.value())
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        Ok(ChatMessage::new(
            MessageId::new(result.last_insert_rowid()),
            room_id,
            user_id,
            content,
            created_at,
        ))
    }

    async fn list_by_room(&self, room_id: RoomId) -> Result<Vec<ChatMessage>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, chat_room_id, user_id, content, created_at
             FROM chat_message
             WHERE chat_room_id = ?
             ORDER BY created_at ASC, id ASC",
        )
        .bind(room_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        rows.iter().map(Self::row_to_message).collect()
    }

    async fn create_room(&self, name: RoomName) -> Result<ChatRoom, StoreError> {
        let result = sqlx::query("INSERT INTO chat_room (name) VALUES (?)")
            .bind(name.as_str())
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        let room_id = RoomId::new(result.last_insert_rowid()).map_err(integrity)?;
        Ok(ChatRoom::new(room_id, name))
    }

    async fn find_room(&self, room_id: RoomId) -> Result<Option<ChatRoom>, StoreError> {
        let row = sqlx::query("SELECT id, name FROM chat_room WHERE id = ?")
            .bind(room_id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;

        match row {
            Some(row) => {
                let name: String = row.try_get("name").map_err(integrity)?;
                Ok(Some(ChatRoom::new(
                    room_id,
                    RoomName::new(name).map_err(integrity)?,
                )))
            }
            None => Ok(None),
        }
    }
}
