//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{ChatRoom, RoomId, RoomName, StoreError},
    infrastructure::dto::http::{ChatMessageDto, CreateRoomRequest, RoomDetailDto, RoomDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a chat room
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomDto>), StatusCode> {
    let name = RoomName::new(request.name).map_err(|e| {
        tracing::warn!("Invalid room name: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    let room = state.store.create_room(name).await.map_err(store_status)?;
    tracing::info!("Created room {} ({})", room.id, room.name);

    Ok((StatusCode::CREATED, Json(RoomDto::from(&room))))
}

/// Get room detail by ID, including the number of live connections
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room = find_room(&state, room_id).await?;
    let connections = state.registry.count_in_room(room.id).await;

    Ok(Json(RoomDetailDto {
        id: room.id.value(),
        name: room.name.as_str().to_string(),
        connections,
    }))
}

/// Get the stored history of a room, oldest first
pub async fn get_room_messages(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
) -> Result<Json<Vec<ChatMessageDto>>, StatusCode> {
    let room = find_room(&state, room_id).await?;
    let messages = state
        .store
        .list_by_room(room.id)
        .await
        .map_err(store_status)?;

    Ok(Json(messages.iter().map(ChatMessageDto::from).collect()))
}

async fn find_room(state: &AppState, room_id: i64) -> Result<ChatRoom, StatusCode> {
    // 不正な ID のルームは存在しないものとして扱う
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::NOT_FOUND)?;
    state
        .store
        .find_room(room_id)
        .await
        .map_err(store_status)?
        .ok_or(StatusCode::NOT_FOUND)
}

fn store_status(e: StoreError) -> StatusCode {
    tracing::error!("Message store error: {}", e);
    match e {
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::Integrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
