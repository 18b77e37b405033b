//! Server-level errors returned from [`run`](crate::run).

use thiserror::Error;

use crate::domain::{StoreError, ValueObjectError};

#[derive(Debug, Error)]
pub enum ServerError {
    /// The message store could not be opened
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A room configured for startup has an invalid name
    #[error("invalid startup room: {0}")]
    InvalidRoom(#[from] ValueObjectError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
