use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    event::{RoomEvent, RoomEventError, RoomEventHandler},
    game::{Audience, Envelope, PlayerId},
    room::RoomHandle,
    websockets::{connection_manager::ConnectionManager, messages::WebSocketMessage},
};

/// Delivers a room's outbound events and chat to the connected players.
pub struct WebSocketRoomSubscriber {
    room: RoomHandle,
    connection_manager: Arc<dyn ConnectionManager>,
}

#[async_trait]
impl RoomEventHandler for WebSocketRoomSubscriber {
    async fn handle_room_event(
        &self,
        room_id: &str,
        event: RoomEvent,
    ) -> Result<(), RoomEventError> {
        match event {
            RoomEvent::Outbound(envelope) => self.deliver(room_id, envelope).await,
            RoomEvent::ChatMessage { player_id, text } => {
                self.broadcast_chat(room_id, &player_id, &text).await
            }
            _ => Ok(()),
        }
    }

    fn handler_name(&self) -> &'static str {
        "WebSocketRoomSubscriber"
    }
}

impl WebSocketRoomSubscriber {
    pub fn new(room: RoomHandle, connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self {
            room,
            connection_manager,
        }
    }

    async fn deliver(&self, room_id: &str, envelope: Envelope) -> Result<(), RoomEventError> {
        let message = WebSocketMessage::from_session_event(&envelope.event);
        let json = message
            .to_json()
            .map_err(|e| RoomEventError::HandlerError(e.to_string()))?;

        debug!(
            room_id = %room_id,
            message_type = ?message.message_type,
            audience = ?envelope.audience,
            "Delivering room message"
        );

        match envelope.audience {
            Audience::Seated(players) => {
                self.connection_manager.send_to_players(&players, &json).await;
            }
            Audience::Player(player_id) => {
                self.connection_manager.send_to_player(&player_id, &json).await;
            }
        }

        Ok(())
    }

    async fn broadcast_chat(
        &self,
        room_id: &str,
        sender: &PlayerId,
        text: &str,
    ) -> Result<(), RoomEventError> {
        let (name, players) = {
            let session = self.room.session();
            (
                session.player_name(sender).map(str::to_string),
                session.player_ids(),
            )
        };

        let Some(name) = name else {
            warn!(room_id = %room_id, player_id = %sender, "Chat from a player not in the room");
            return Err(RoomEventError::ConnectionError(format!(
                "Unknown chat sender: {}",
                sender
            )));
        };

        let json = WebSocketMessage::chat(&name, text)
            .to_json()
            .map_err(|e| RoomEventError::HandlerError(e.to_string()))?;
        self.connection_manager.send_to_players(&players, &json).await;

        Ok(())
    }
}
