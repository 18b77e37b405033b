//! Shared utilities for Roomcast.
//!
//! Logging setup and time helpers used by the server binary and library.

pub mod logger;
pub mod time;
