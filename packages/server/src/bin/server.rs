//! Per-room WebSocket chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roomcast-server -- --room lobby
//! ```

use clap::Parser;
use roomcast_server::{
    ServerConfig,
    config::{DEFAULT_MAX_DB_CONNECTIONS, DEFAULT_PORT},
};
use roomcast_shared::logger::setup_logger;

#[derive(Debug, Parser)]
#[command(version, about = "Per-room WebSocket chat server")]
struct Args {
    /// Interface to bind
    #[arg(long, env = "ROOMCAST_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "ROOMCAST_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// SQLite database URL; history is kept in memory when omitted
    #[arg(long, env = "ROOMCAST_DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of pooled database connections
    #[arg(long, env = "ROOMCAST_MAX_DB_CONNECTIONS", default_value_t = DEFAULT_MAX_DB_CONNECTIONS)]
    max_db_connections: u32,

    /// Room to create at startup (repeatable, in-memory store only)
    #[arg(long = "room")]
    rooms: Vec<String>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "ROOMCAST_LOG_LEVEL", default_value = "debug")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            database_url: args.database_url,
            max_db_connections: args.max_db_connections,
            rooms: args.rooms,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Run the server
    if let Err(e) = roomcast_server::run(args.into()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
