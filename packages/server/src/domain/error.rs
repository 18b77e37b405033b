//! Domain layer error definitions.

use thiserror::Error;

use super::{session::SessionState, value_object::ConnectionId};

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// RoomId must be a positive integer
    #[error("RoomId must be positive (got {0})")]
    RoomIdNotPositive(i64),

    /// UserId must be a positive integer
    #[error("UserId must be positive (got {0})")]
    UserIdNotPositive(i64),

    /// MessageContent validation error
    #[error("MessageContent cannot be empty")]
    MessageContentEmpty,

    /// MessageContent too long error
    #[error("MessageContent cannot exceed {max} bytes (got {actual})")]
    MessageContentTooLong { max: usize, actual: usize },

    /// RoomName validation error
    #[error("RoomName cannot be empty")]
    RoomNameEmpty,

    /// RoomName too long error
    #[error("RoomName cannot exceed {max} characters (got {actual})")]
    RoomNameTooLong { max: usize, actual: usize },
}

/// Errors raised by the session state machine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid session transition: {from:?} -> {to:?}")]
    InvalidTransition { from: SessionState, to: SessionState },
}

/// Errors raised when writing to a connection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The writer side of the connection is gone
    #[error("connection {0} is closed")]
    Closed(ConnectionId),
}

/// Errors raised by the connection registry.
///
/// Both variants signal a broken lifecycle invariant, not a user error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("connection {0} is already registered")]
    DuplicateConnection(ConnectionId),

    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),
}

/// Errors raised by message store implementations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or failed to answer
    #[error("message store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the write (constraint violation, corrupt row, ...)
    #[error("message store integrity error: {0}")]
    Integrity(String),
}
