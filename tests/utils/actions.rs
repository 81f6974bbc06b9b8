#![allow(dead_code)]

use serde_json::json;
use tokio::time::sleep;

use gongzhu::{
    game::Phase,
    websockets::{release_player, MessageHandler, MessageType, WebSocketMessage},
};

use super::setup::{TestSetup, SETTLE};

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a raw frame from a player and wait for processing
    pub async fn send_raw(&self, name: &str, raw: &str) {
        let seat = self.seat(name);
        self.input_handler
            .handle_message(&seat.player_id, &seat.room.id, raw.to_string())
            .await;
        sleep(SETTLE).await;
    }

    pub async fn send_message(&self, name: &str, message: WebSocketMessage) {
        self.send_raw(name, &message.to_json().unwrap()).await;
    }

    pub async fn clear_messages(&self) {
        self.mock_conn_manager.clear_messages().await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn send_chat(&self, name: &str, text: &str) {
        self.send_message(
            name,
            WebSocketMessage::new(MessageType::Chat, json!({ "text": text })),
        )
        .await;
    }

    pub async fn play_card(&self, name: &str, token: &str) {
        self.send_message(
            name,
            WebSocketMessage::new(MessageType::PlayCard, json!({ "card": token })),
        )
        .await;
    }

    /// Drops a player's connection, as when their socket closes.
    pub async fn disconnect(&mut self, name: &str) {
        let index = self
            .players
            .iter()
            .position(|(n, _)| n == name)
            .unwrap_or_else(|| panic!("{} is not seated", name));
        let (_, seat) = self.players.remove(index);
        release_player(&self.app_state, &seat).await;
        sleep(SETTLE).await;
    }

    /// Whoever holds the turn plays the first card in their hand.
    /// Returns false when nobody is being asked to play.
    pub async fn play_any_card(&self) -> bool {
        let (name, token) = {
            let room = self.room();
            let session = room.session();
            let Phase::AwaitingPlay { seat } = session.phase() else {
                return false;
            };
            let player = &session.players()[seat];
            (player.name.clone(), player.hand[0].to_string())
        };
        self.play_card(&name, &token).await;
        true
    }
}
