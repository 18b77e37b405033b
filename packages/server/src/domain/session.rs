//! Session lifecycle state machine.
//!
//! ```text
//! Connecting --activate--> Active --close--> Closed
//!      |                                       ^
//!      +-----------------close-----------------+
//! ```
//!
//! There is no way back to `Active` once a session is `Closed`.

use super::{SessionContext, connection::Connection, error::SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Active,
    Closed,
}

/// One client connection bound to its (room, user) context
#[derive(Debug)]
pub struct Session {
    connection: Connection,
    context: SessionContext,
    state: SessionState,
}

impl Session {
    /// Start a session in the `Connecting` state
    pub fn new(connection: Connection, context: SessionContext) -> Self {
        Self {
            connection,
            context,
            state: SessionState::Connecting,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn context(&self) -> SessionContext {
        self.context
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// `Connecting -> Active`
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` from any other state
    pub fn activate(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Connecting => {
                self.state = SessionState::Active;
                Ok(())
            }
            from => Err(SessionError::InvalidTransition {
                from,
                to: SessionState::Active,
            }),
        }
    }

    /// Move to `Closed`. Returns `false` if the session was already closed.
    pub fn close(&mut self) -> bool {
        let was_open = self.state != SessionState::Closed;
        self.state = SessionState::Closed;
        was_open
    }
}
