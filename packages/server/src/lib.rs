//! Per-room WebSocket chat server.
//!
//! Clients connect to a room, receive its stored history, and from then on
//! see every message posted to the room. Messages are persisted before they
//! are delivered.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ServerConfig;
pub use error::ServerError;
pub use ui::run;
