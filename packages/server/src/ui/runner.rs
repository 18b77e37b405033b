//! Router construction and server startup.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::{MessageStore, RoomName},
    error::ServerError,
    infrastructure::repository::{InMemoryMessageStore, SqliteMessageStore},
};

use super::{
    handler::{create_room, get_room_detail, get_room_messages, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Build the application router around `state`
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/rooms", post(create_room))
        .route("/api/rooms/{room_id}", get(get_room_detail))
        .route("/api/rooms/{room_id}/messages", get(get_room_messages))
        .route("/ws/rooms/{room_id}", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn open_store(config: &ServerConfig) -> Result<Arc<dyn MessageStore>, ServerError> {
    match &config.database_url {
        Some(url) => {
            if !config.rooms.is_empty() {
                tracing::warn!("Startup rooms are only created for the in-memory store");
            }
            let store = SqliteMessageStore::connect(url, config.max_db_connections).await?;
            Ok(Arc::new(store))
        }
        None => {
            let store = InMemoryMessageStore::new();
            for name in &config.rooms {
                let room = store.create_room(RoomName::new(name.clone())?).await?;
                tracing::info!("Created room {} ({})", room.id, room.name);
            }
            tracing::info!("Using in-memory message store");
            Ok(Arc::new(store))
        }
    }
}

/// Start the server and serve until a shutdown signal arrives
///
/// # Errors
///
/// Returns `ServerError` if the store cannot be opened, the address cannot be
/// bound, or the server fails while serving
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let store = open_store(&config).await?;
    let state = Arc::new(AppState::new(store));

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
    match listener.local_addr() {
        Ok(local) => tracing::info!("Listening on {}", local),
        Err(_) => tracing::info!("Listening on {}", address),
    }

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    tracing::info!("Server stopped");
    Ok(())
}
