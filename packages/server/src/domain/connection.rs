//! Handle to a live duplex channel with a client.
//!
//! The transport layer owns the socket. What the core sees is the sending
//! half of an unbounded channel; a writer task drains the receiving half into
//! the socket. Once that task is gone the channel is closed and every
//! `send_text` fails with [`ConnectionError::Closed`].

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{ConnectionId, error::ConnectionError, factory::ConnectionIdFactory};

/// Cloneable handle to one client connection
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    sender: UnboundedSender<String>,
}

impl Connection {
    /// Wrap an outbound channel in a connection with a fresh id.
    pub fn new(sender: UnboundedSender<String>) -> Self {
        Self {
            id: ConnectionIdFactory::generate(),
            sender,
        }
    }

    /// Create a connection together with the receiver its writer task drains.
    pub fn channel() -> (Self, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    /// Queue a text frame for the client.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::Closed` when the writer side is gone
    pub fn send_text(&self, text: String) -> Result<(), ConnectionError> {
        self.sender
            .send(text)
            .map_err(|_| ConnectionError::Closed(self.id))
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
