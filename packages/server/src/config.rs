//! Server configuration.

/// Default port the server listens on
pub const DEFAULT_PORT: u16 = 3000;

/// Default size of the SQLite connection pool
pub const DEFAULT_MAX_DB_CONNECTIONS: u32 = 5;

/// Runtime configuration for [`run`](crate::run)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind (0 picks a free port)
    pub port: u16,
    /// SQLite URL (e.g. `sqlite://roomcast.db`). `None` keeps history in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled SQLite connections
    pub max_db_connections: u32,
    /// Rooms created at startup. Only applied to the in-memory store.
    pub rooms: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            database_url: None,
            max_db_connections: DEFAULT_MAX_DB_CONNECTIONS,
            rooms: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
