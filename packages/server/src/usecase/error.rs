//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{RegistryError, SessionError, StoreError};

/// 接続処理のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// セッションが Connecting 状態ではない
    #[error(transparent)]
    InvalidState(#[from] SessionError),

    /// 同じ接続が既に登録されている（ライフサイクルの不変条件違反）
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// 履歴の取得に失敗した
    #[error("failed to replay room history: {0}")]
    HistoryUnavailable(StoreError),
}

/// ブロードキャスト処理のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BroadcastError {
    /// 送信元の接続が登録されていない（ライフサイクルの不変条件違反）
    #[error(transparent)]
    UnknownConnection(#[from] RegistryError),

    /// メッセージの永続化に失敗した。誰にも配信されていない
    #[error("message was not persisted: {0}")]
    Persistence(StoreError),
}
