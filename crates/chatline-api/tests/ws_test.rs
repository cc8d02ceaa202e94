//! Integration tests for the WebSocket endpoint and health checks.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use chatline_api::{AppState, build_app};
use chatline_auth::{JwtDecoder, JwtEncoder};
use chatline_core::config::AppConfig;
use chatline_core::types::{MessageId, RoomId, UserId};
use chatline_database::MemoryStore;
use chatline_realtime::RealtimeEngine;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CONFIG: &str = r#"
[database]
provider = "memory"
url = ""

[auth]
jwt_secret = "ws-test-secret"
"#;

struct TestApp {
    state: AppState,
    store: MemoryStore,
    tokens: JwtEncoder,
}

impl TestApp {
    fn new() -> Self {
        let config = AppConfig::from_toml(CONFIG).expect("config");
        let store = MemoryStore::new(config.server.media_url.clone());
        let realtime = Arc::new(RealtimeEngine::new(
            config.realtime.clone(),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(JwtDecoder::new(&config.auth)),
        ));
        let tokens = JwtEncoder::new(&config.auth);
        let state = AppState {
            config: Arc::new(config),
            realtime,
            database: None,
        };
        Self {
            state,
            store,
            tokens,
        }
    }

    fn router(&self) -> axum::Router {
        build_app(self.state.clone(), &self.state.config.server.cors)
    }

    async fn serve(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = self.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn connect(&self, addr: SocketAddr, user: i64) -> Client {
        let token = self.tokens.generate_access_token(UserId(user)).unwrap();
        let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws?token={token}"))
            .await
            .expect("handshake");
        client
    }
}

async fn next_json(client: &mut Client) -> Value {
    let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .expect("timed out waiting for a frame")
        .expect("stream ended")
        .expect("websocket error");
    match frame {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("unexpected frame {other:?}"),
    }
}

async fn wait_for_connections(app: &TestApp, expected: usize) {
    for _ in 0..100 {
        if app.state.realtime.registry.connection_count() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {expected} connections, found {}",
        app.state.realtime.registry.connection_count()
    );
}

#[tokio::test]
async fn test_handshake_without_valid_token_is_rejected() {
    let app = TestApp::new();
    app.store.insert_user(UserId(1), "u1");
    let addr = app.serve().await;

    for url in [
        format!("ws://{addr}/ws"),
        format!("ws://{addr}/ws?token=not-a-jwt"),
    ] {
        let err = tokio_tungstenite::connect_async(url).await.unwrap_err();
        match err {
            tungstenite::Error::Http(response) => {
                assert_eq!(response.status().as_u16(), 401);
            }
            other => panic!("expected HTTP rejection, got {other:?}"),
        }
    }

    assert_eq!(app.state.realtime.registry.group_count(), 0);
    assert_eq!(app.state.realtime.metrics.snapshot().connections_rejected, 2);
}

#[tokio::test]
async fn test_message_reference_fans_out_to_room() {
    let app = TestApp::new();
    app.store.insert_user(UserId(1), "u1");
    app.store.insert_user(UserId(2), "u2");
    app.store.insert_private_room(RoomId(7), UserId(1), UserId(2));
    app.store
        .insert_message_with_id(MessageId(42), RoomId(7), UserId(1), "hi")
        .unwrap();
    let addr = app.serve().await;

    let mut sender = app.connect(addr, 1).await;
    let mut recipient = app.connect(addr, 2).await;
    wait_for_connections(&app, 2).await;

    // Malformed frames are dropped and the connection stays usable.
    sender
        .send(Message::Text(r#"{"room_id": 7}"#.into()))
        .await
        .unwrap();
    sender
        .send(Message::Text(r#"{"room_id": 7, "message_id": 42}"#.into()))
        .await
        .unwrap();

    let own_copy = next_json(&mut sender).await;
    assert_eq!(own_copy["type"], "message");
    assert_eq!(own_copy["id"], 42);
    assert_eq!(own_copy["room_id"], 7);
    assert_eq!(own_copy["is_group"], false);

    let delivery = next_json(&mut recipient).await;
    assert_eq!(delivery["type"], "message");
    assert_eq!(delivery["room_name"], "u1 & u2");
    assert_eq!(delivery["sender_username"], "u1");

    let notification = next_json(&mut recipient).await;
    assert_eq!(
        notification,
        serde_json::json!({
            "type": "notification",
            "room_id": 7,
            "room_name": "u1 & u2",
            "sender_username": "u1",
            "message": "hi",
        })
    );

    sender.close(None).await.unwrap();
    wait_for_connections(&app, 1).await;
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app
        .router()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["status"], "ok");
}

#[tokio::test]
async fn test_detailed_health_reports_engine_state() {
    let app = TestApp::new();
    let response = app
        .router()
        .oneshot(
            Request::get("/api/health/detailed")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["database"], "memory");
    assert_eq!(json["data"]["ws_connections"], 0);
    assert!(json["data"]["metrics"].get("routes_completed").is_some());
}
