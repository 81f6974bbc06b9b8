use async_trait::async_trait;
use axum::{
    extract::{ws::WebSocket, Query, State, WebSocketUpgrade},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::event::{EventBus, RoomEvent, RoomSubscription};
use crate::game::{GameRoomSubscriber, PlayerId};
use crate::room::{JoinedRoom, RoomCode, RoomHandle};
use crate::shared::{AppError, AppState};
use crate::websockets::messages::{ClientMessage, WebSocketMessage};

use super::socket::{Connection, MessageHandler, SocketWrapper};
use super::websocket_room_subscriber::WebSocketRoomSubscriber;

pub const DEFAULT_PLAYER_NAME: &str = "Player";
pub const MAX_NAME_CHARS: usize = 20;
pub const MAX_CHAT_CHARS: usize = 50;

/// Message handler for receiving WebSocket messages from the client
pub struct WebsocketReceiveHandler {
    event_bus: EventBus,
}

impl WebsocketReceiveHandler {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, player_id: &PlayerId, room_id: &str, message: String) {
        debug!(player_id = %player_id, room_id = %room_id, message = %message, "Received message");

        let event = match ClientMessage::parse(&message) {
            Ok(ClientMessage::PlayCard { card }) => RoomEvent::TryPlayCard {
                player_id: *player_id,
                card,
            },
            Ok(ClientMessage::Chat { text }) => RoomEvent::ChatMessage {
                player_id: *player_id,
                text: text.chars().take(MAX_CHAT_CHARS).collect(),
            },
            Err(e) => {
                warn!(
                    player_id = %player_id,
                    room_id = %room_id,
                    error = %e,
                    "Dropping unparseable WebSocket message"
                );
                return;
            }
        };

        self.event_bus.emit_to_room(room_id, event).await;
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct JoinParams {
    pub room: Option<String>,
    pub name: Option<String>,
}

/// Trims a requested display name, falling back to a default when blank.
pub fn display_name(raw: Option<&str>) -> String {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        trimmed.chars().take(MAX_NAME_CHARS).collect()
    }
}

/// A player seated in a room for the lifetime of their connection.
#[derive(Debug, Clone)]
pub struct Seat {
    pub player_id: PlayerId,
    pub room: RoomHandle,
}

/// GET /ws?room=<code>&name=<name>
///
/// Validation happens after the upgrade so a refusal can carry a close code.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<JoinParams>,
    State(app_state): State<AppState>,
) -> Response {
    info!(room = ?params.room, name = ?params.name, "WebSocket connection requested");
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, params, app_state))
}

async fn handle_websocket_connection(mut socket: WebSocket, params: JoinParams, app_state: AppState) {
    let name = display_name(params.name.as_deref());
    let raw_code = params.room.unwrap_or_default();
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    let seat = match admit_player(&app_state, &raw_code, &name, outbound_sender).await {
        Ok(seat) => seat,
        Err(e) => {
            warn!(room = %raw_code, name = %name, error = %e, "Refusing WebSocket connection");
            refuse(&mut socket, &e).await;
            return;
        }
    };

    info!(
        room_id = %seat.room.id,
        code = %seat.room.code,
        player_id = %seat.player_id,
        name = %name,
        "WebSocket connection established"
    );

    let message_handler = Arc::new(WebsocketReceiveHandler::new(app_state.event_bus.clone()));
    let connection = Connection::new(
        seat.player_id,
        seat.room.id.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    match connection.run().await {
        Ok(()) => {
            info!(room_id = %seat.room.id, player_id = %seat.player_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(room_id = %seat.room.id, player_id = %seat.player_id, error = ?e, "WebSocket connection error");
        }
    }

    release_player(&app_state, &seat).await;
}

async fn refuse(socket: &mut dyn SocketWrapper, error: &AppError) {
    if !matches!(error, AppError::InvalidRoomCode(_)) {
        if let Ok(json) = WebSocketMessage::error(error.to_string()).to_json() {
            let _ = socket.send_message(json).await;
        }
    }
    let _ = socket.close_with(error.close_code(), error.to_string()).await;
}

/// Seats a player and wires their outbound channel. The join's own events
/// are published only after the room's subscribers are listening.
pub async fn admit_player(
    app_state: &AppState,
    raw_code: &str,
    name: &str,
    outbound_sender: mpsc::UnboundedSender<String>,
) -> Result<Seat, AppError> {
    let code = RoomCode::parse(raw_code)?;
    let JoinedRoom {
        room,
        player_id,
        outcome,
        epoch,
    } = app_state.registry.join(&code, name)?;

    start_room_subscribers(app_state, &room).await;

    app_state
        .connection_manager
        .add_connection(player_id, outbound_sender)
        .await;

    app_state
        .event_bus
        .emit_to_room(
            &room.id,
            RoomEvent::PlayerJoined {
                player_id,
                outcome,
                epoch,
            },
        )
        .await;

    Ok(Seat { player_id, room })
}

/// Drops the player's connection and lets the room handle the departure.
pub async fn release_player(app_state: &AppState, seat: &Seat) {
    app_state
        .connection_manager
        .remove_connection(&seat.player_id)
        .await;

    app_state
        .event_bus
        .emit_to_room(
            &seat.room.id,
            RoomEvent::PlayerDisconnected {
                player_id: seat.player_id,
            },
        )
        .await;

    debug!(room_id = %seat.room.id, player_id = %seat.player_id, "Disconnect event emitted");
}

async fn start_room_subscribers(app_state: &AppState, room: &RoomHandle) {
    room.start_subscribers_once(|| async {
        let game = Arc::new(GameRoomSubscriber::new(
            room.clone(),
            app_state.registry.clone(),
            app_state.event_bus.clone(),
        ));
        let sockets = Arc::new(WebSocketRoomSubscriber::new(
            room.clone(),
            app_state.connection_manager.clone(),
        ));

        RoomSubscription::new(room.id.clone(), game, app_state.event_bus.clone())
            .start()
            .await;
        RoomSubscription::new(room.id.clone(), sockets, app_state.event_bus.clone())
            .start()
            .await;
    })
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Card, Rank, Suit};
    use rstest::rstest;
    use tokio::sync::broadcast;

    #[rstest]
    #[case(None, "Player")]
    #[case(Some(""), "Player")]
    #[case(Some("   "), "Player")]
    #[case(Some("  alice "), "alice")]
    #[case(Some("abcdefghijklmnopqrstuvwxyz"), "abcdefghijklmnopqrst")]
    fn test_display_name(#[case] raw: Option<&str>, #[case] expected: &str) {
        assert_eq!(display_name(raw), expected);
    }

    async fn receive_from(bus: &EventBus, raw: &str) -> Option<RoomEvent> {
        let mut receiver: broadcast::Receiver<RoomEvent> = bus.subscribe_to_room("room-a").await;
        let handler = WebsocketReceiveHandler::new(bus.clone());
        handler
            .handle_message(&PlayerId::new(), "room-a", raw.to_string())
            .await;
        receiver.try_recv().ok()
    }

    #[tokio::test]
    async fn test_play_card_becomes_room_event() {
        let bus = EventBus::new();
        let event = receive_from(&bus, r#"{"type":"PLAY_CARD","payload":{"card":"SQ"}}"#).await;

        match event {
            Some(RoomEvent::TryPlayCard { card, .. }) => {
                assert_eq!(card, Card::new(Rank::Queen, Suit::Spades))
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chat_is_truncated() {
        let bus = EventBus::new();
        let long = "x".repeat(80);
        let raw = format!(r#"{{"type":"CHAT","payload":{{"text":"{}"}}}}"#, long);

        match receive_from(&bus, &raw).await {
            Some(RoomEvent::ChatMessage { text, .. }) => assert_eq!(text.chars().count(), 50),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_message_is_dropped() {
        let bus = EventBus::new();
        assert!(receive_from(&bus, "{oops").await.is_none());
        assert!(receive_from(&bus, r#"{"type":"PLAY_CARD","payload":{"card":"Q"}}"#)
            .await
            .is_none());
    }
}
