#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use gongzhu::{websockets::ConnectionManager, PlayerId};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Records every frame sent to each player instead of writing to sockets.
#[derive(Clone, Default)]
pub struct MockConnectionManager {
    sent_messages: Arc<RwLock<HashMap<PlayerId, VecDeque<String>>>>,
    connected_players: Arc<RwLock<Vec<PlayerId>>>,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_connected(&self, player_id: &PlayerId) -> bool {
        self.connected_players.read().await.contains(player_id)
    }

    pub async fn get_messages_for(&self, player_id: &PlayerId) -> Vec<String> {
        self.sent_messages
            .read()
            .await
            .get(player_id)
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Pops the oldest unread frame for the player.
    pub async fn consume_message_for(&self, player_id: &PlayerId) -> Option<String> {
        self.sent_messages
            .write()
            .await
            .get_mut(player_id)
            .and_then(|queue| queue.pop_front())
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn add_connection(&self, player_id: PlayerId, _sender: mpsc::UnboundedSender<String>) {
        self.connected_players.write().await.push(player_id);
    }

    async fn remove_connection(&self, player_id: &PlayerId) {
        self.connected_players
            .write()
            .await
            .retain(|p| p != player_id);
    }

    async fn send_to_player(&self, player_id: &PlayerId, message: &str) {
        if !self.is_connected(player_id).await {
            return;
        }
        self.sent_messages
            .write()
            .await
            .entry(*player_id)
            .or_default()
            .push_back(message.to_string());
    }

    async fn send_to_players(&self, player_ids: &[PlayerId], message: &str) {
        for player_id in player_ids {
            self.send_to_player(player_id, message).await;
        }
    }
}
