//! Test server fixture.
//!
//! Starts the application on an ephemeral port inside the test runtime, with
//! an in-memory message store.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use roomcast_server::{
    domain::{ChatRoom, ConnectionRegistry, MessageStore, RoomId, RoomName},
    infrastructure::repository::InMemoryMessageStore,
    ui::{create_app, state::AppState},
};
use tokio::task::JoinHandle;

pub struct TestServer {
    addr: SocketAddr,
    pub state: Arc<AppState>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with one room per name (ids are assigned from 1).
    pub async fn start(rooms: &[&str]) -> (Self, Vec<ChatRoom>) {
        let store = Arc::new(InMemoryMessageStore::new());
        let mut created = Vec::new();
        for name in rooms {
            let room = store
                .create_room(RoomName::new(name.to_string()).expect("valid room name"))
                .await
                .expect("Failed to create room");
            created.push(room);
        }

        (Self::start_with_store(store).await, created)
    }

    /// Start a server on top of an arbitrary message store.
    pub async fn start_with_store(store: Arc<dyn MessageStore>) -> Self {
        let state = Arc::new(AppState::new(store));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local addr");
        let app = create_app(state.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, room_id: i64, user_id: i64) -> String {
        format!("ws://{}/ws/rooms/{}?user_id={}", self.addr, room_id, user_id)
    }

    /// Wait until `count` connections are registered in the room.
    pub async fn wait_for_connections(&self, room_id: i64, count: usize) {
        let room_id = RoomId::new(room_id).expect("valid room id");
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            if self.state.registry.count_in_room(room_id).await == count {
                return;
            }
            if tokio::time::Instant::now() > deadline {
                panic!("timed out waiting for {count} connection(s) in room {room_id}");
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
