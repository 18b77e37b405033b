//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod broadcast_message;
pub mod connect_session;
pub mod disconnect_session;
pub mod error;
pub mod room_locks;

pub use broadcast_message::{BroadcastMessageUseCase, BroadcastReport};
pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use error::{BroadcastError, ConnectError};
pub use room_locks::RoomLocks;
