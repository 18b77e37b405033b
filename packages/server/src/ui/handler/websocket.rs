//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};

use crate::{
    domain::{
        Connection, MessageContent, RoomId, Session, SessionContext, UserId,
        formatter::render_notice,
    },
    ui::state::{AppState, ConnectQuery},
    usecase::{BroadcastError, BroadcastMessageUseCase},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Convert i64 -> RoomId / UserId (Domain Model)
    let context = match (RoomId::try_from(room_id), UserId::try_from(query.user_id)) {
        (Ok(room_id), Ok(user_id)) => SessionContext::new(room_id, user_id),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!("Rejecting WebSocket connection: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    // Room existence is checked here, before the core sees the connection
    match state.store.find_room(context.room_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!("Room {} does not exist. Rejecting connection.", room_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(e) => {
            tracing::error!("Failed to look up room {}: {}", room_id, e);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, context)))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, context: SessionContext) {
    let (mut sender, mut receiver) = socket.split();

    // Outbound lines are queued on the connection and written by this task
    let (connection, mut rx) = Connection::channel();
    let connection_id = *connection.id();
    let mut session = Session::new(connection.clone(), context);

    let mut send_task = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Register and replay history
    if let Err(e) = state.connect_usecase().execute(&mut session).await {
        tracing::warn!("Connection {} could not join: {}", connection_id, e);
        if connection
            .send_text(render_notice("could not join the room"))
            .is_err()
        {
            tracing::debug!("Connection {} already closed", connection_id);
        }
        // Dropping the last handles lets the writer flush the notice and stop
        drop(connection);
        drop(session);
        let _ = send_task.await;
        return;
    }

    let broadcast = state.broadcast_usecase();
    let reader_connection = connection.clone();

    // Spawn a task to receive messages from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!(
                        "WebSocket error on connection {}: {}",
                        reader_connection.id(),
                        e
                    );
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    relay_detached(&broadcast, &reader_connection, text.as_str().to_owned()).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection {} requested close", reader_connection.id());
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Always reached, whether the client closed cleanly or the transport failed
    state.disconnect_usecase().execute(&mut session).await;
}

/// Relay one inbound text frame on its own task and wait for it.
///
/// The reader task is aborted when the writer ends. A broadcast that has
/// already started keeps running to the end of its fan-out, so a stored
/// message always reaches the rest of the room.
async fn relay_detached(
    broadcast: &BroadcastMessageUseCase,
    connection: &Connection,
    text: String,
) {
    let relay = tokio::spawn(relay_text(broadcast.clone(), connection.clone(), text));
    if let Err(e) = relay.await {
        tracing::error!("Relay task for connection {} failed: {}", connection.id(), e);
    }
}

/// Validate one inbound text frame and broadcast it to the room.
///
/// Failures are reported to this connection only.
async fn relay_text(broadcast: BroadcastMessageUseCase, connection: Connection, text: String) {
    let content = match MessageContent::try_from(text) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Invalid message from connection {}: {}", connection.id(), e);
            notify(&connection, &format!("message rejected: {e}"));
            return;
        }
    };

    match broadcast.execute(connection.id(), content).await {
        Ok(_) => {}
        Err(BroadcastError::UnknownConnection(e)) => {
            tracing::error!("Lifecycle invariant broken: {}", e);
            notify(&connection, "message could not be sent");
        }
        Err(e @ BroadcastError::Persistence(_)) => {
            tracing::warn!("Broadcast from connection {} failed: {}", connection.id(), e);
            notify(&connection, "message could not be sent");
        }
    }
}

fn notify(connection: &Connection, text: &str) {
    if connection.send_text(render_notice(text)).is_err() {
        tracing::debug!("Connection {} already closed", connection.id());
    }
}
