//! Shared fixtures for real-time integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use tokio::sync::mpsc;

use chatline_auth::{JwtDecoder, JwtEncoder};
use chatline_core::config::{AuthConfig, RealtimeConfig};
use chatline_core::traits::ChatStore;
use chatline_core::types::UserId;
use chatline_database::MemoryStore;
use chatline_realtime::{ConnectionSession, RealtimeEngine, ServerEvent};

/// Engine over an in-memory store with real HS256 tokens.
pub struct Harness {
    pub engine: RealtimeEngine,
    pub store: MemoryStore,
    pub tokens: JwtEncoder,
}

impl Harness {
    pub fn new() -> Self {
        let store = MemoryStore::default();
        Self::with_chat_store(store.clone(), Arc::new(store))
    }

    /// Users come from `store`; messages and rooms come from `chat`.
    pub fn with_chat_store(store: MemoryStore, chat: Arc<dyn ChatStore>) -> Self {
        let auth = AuthConfig {
            jwt_secret: "integration-secret".to_string(),
            ..AuthConfig::default()
        };
        let engine = RealtimeEngine::new(
            RealtimeConfig::default(),
            chat,
            Arc::new(store.clone()),
            Arc::new(JwtDecoder::new(&auth)),
        );
        Self {
            engine,
            store,
            tokens: JwtEncoder::new(&auth),
        }
    }

    /// Authenticate and subscribe a connection for `user`.
    pub async fn connect(
        &self,
        user: i64,
    ) -> (ConnectionSession, mpsc::Receiver<Arc<ServerEvent>>) {
        let token = self
            .tokens
            .generate_access_token(UserId(user))
            .expect("token");
        let mut session = self.engine.open_session();
        assert!(session.authenticate(Some(&token)).await, "user {user} rejected");
        let rx = session.subscribe().expect("subscribe");
        session.activate();
        (session, rx)
    }
}

/// Everything currently queued on a connection.
pub fn drain(rx: &mut mpsc::Receiver<Arc<ServerEvent>>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event.as_ref().clone());
    }
    events
}

pub fn frame(room_id: i64, message_id: i64) -> String {
    format!(r#"{{"room_id": {room_id}, "message_id": {message_id}}}"#)
}
