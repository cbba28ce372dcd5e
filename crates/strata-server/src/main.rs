//! Strata WebSocket Relay Server
//!
//! Relays drawing segments between clients in the same room.
//!
//! ## Protocol
//!
//! Messages are JSON with the following format:
//! ```json
//! { "type": "join", "room": "room-id", "name": "nickname" }
//! { "type": "draw", "prev": { "x": 1, "y": 2 }, "curr": { "x": 3, "y": 4 }, "color": "#000", "size": 2 }
//! ```
//! The server answers a join with `joined` (the room's nicknames) or
//! `error`, forwards `draw` to every other peer and tells the room `leave`
//! when a peer disconnects.

mod rooms;

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use rooms::{AppState, RoomMessage};
use std::{net::SocketAddr, sync::Arc};
use strata_core::{ClientMessage, ServerMessage};
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const ADDR_ENV: &str = "STRATA_RELAY_ADDR";
const DEFAULT_ADDR: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 3030);

/// Bind address from the environment, falling back to the default.
fn bind_addr() -> SocketAddr {
    match std::env::var(ADDR_ENV) {
        Ok(value) => value.parse().unwrap_or_else(|e| {
            warn!("Invalid {}={:?} ({}), using {}", ADDR_ENV, value, e, DEFAULT_ADDR);
            DEFAULT_ADDR
        }),
        Err(_) => DEFAULT_ADDR,
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "strata_server=info,tower_http=info".into()),
        )
        .init();

    let state = Arc::new(AppState::new());

    let app = Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = bind_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return Err(e);
        }
    };
    info!("Strata relay server listening on {}", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);

    axum::serve(listener, app).await
}

/// Index page
async fn index() -> &'static str {
    "Strata Relay Server - Connect via WebSocket at /ws"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serialize and send one message. Returns false once the socket is gone.
async fn send(sender: &mut SplitSink<WebSocket, Message>, msg: &ServerMessage) -> bool {
    match msg.to_json() {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            error!("Failed to serialize {:?}: {}", msg, e);
            true
        }
    }
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let peer_id = Uuid::new_v4().to_string();
    info!("New connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let mut current_room: Option<String> = None;
    let mut room_rx: Option<broadcast::Receiver<RoomMessage>> = None;

    loop {
        tokio::select! {
            // Handle incoming messages from client
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let client_msg = match ClientMessage::parse(text.as_str()) {
                            Ok(client_msg) => client_msg,
                            Err(e) => {
                                warn!("Invalid message from {}: {}", peer_id, e);
                                continue;
                            }
                        };
                        match client_msg {
                            ClientMessage::Join { room, name } => {
                                // Leave current room if any
                                if let Some(old_room) = current_room.take() {
                                    leave(&state, &old_room, &peer_id);
                                    room_rx = None;
                                }

                                match state.join_room(&room, &peer_id, &name) {
                                    Ok((rx, players)) => {
                                        room_rx = Some(rx);
                                        current_room = Some(room.clone());
                                        info!("Peer {} joined room {} as {}", peer_id, room, name);
                                        if !send(&mut sender, &ServerMessage::Joined { players }).await {
                                            break;
                                        }
                                    }
                                    Err(e) => {
                                        info!("Peer {} refused from room {}: {}", peer_id, room, e);
                                        let err = ServerMessage::Error { text: e.to_string() };
                                        if !send(&mut sender, &err).await {
                                            break;
                                        }
                                    }
                                }
                            }
                            // Draws go out exactly as the client sent them.
                            ClientMessage::Draw(_) => match current_room {
                                Some(ref room) => state.relay(room, &peer_id, text.as_str().to_string()),
                                None => debug!("Dropping draw from {} before join", peer_id),
                            },
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Ok(_)) => {} // Ignore binary and ping/pong
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", peer_id, e);
                        break;
                    }
                }
            }

            // Handle broadcast messages from room
            msg = async {
                match &mut room_rx {
                    Some(rx) => rx.recv().await,
                    None => {
                        // No room joined, just wait forever
                        std::future::pending().await
                    }
                }
            } => {
                match msg {
                    // Don't echo back to sender
                    Ok((from, json)) if from != peer_id => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Peer {} lagged, {} messages skipped", peer_id, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        room_rx = None;
                    }
                }
            }
        }
    }

    // Cleanup on disconnect
    if let Some(ref room) = current_room {
        leave(&state, room, &peer_id);
    }
    info!("Connection closed: {} ({} rooms open)", peer_id, state.room_count());
}

/// Remove a peer and tell the rest of the room.
fn leave(state: &AppState, room: &str, peer_id: &str) {
    if let Some(name) = state.leave_room(room, peer_id) {
        info!(
            "Peer {} ({}) left room {}, {} remaining",
            peer_id,
            name,
            room,
            state.players(room).len()
        );
        state.broadcast(room, peer_id, &ServerMessage::Leave { name });
    }
}
