use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use crate::game::PlayerId;

/// Outbound text frames, by connected player.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn add_connection(&self, player_id: PlayerId, sender: mpsc::UnboundedSender<String>);

    async fn remove_connection(&self, player_id: &PlayerId);

    async fn send_to_player(&self, player_id: &PlayerId, message: &str);

    async fn send_to_players(&self, player_ids: &[PlayerId], message: &str);
}

#[derive(Default)]
pub struct InMemoryConnectionManager {
    connections: Arc<RwLock<HashMap<PlayerId, mpsc::UnboundedSender<String>>>>,
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, player_id: PlayerId, sender: mpsc::UnboundedSender<String>) {
        let mut connections = self.connections.write().await;
        connections.insert(player_id, sender);
    }

    async fn remove_connection(&self, player_id: &PlayerId) {
        let mut connections = self.connections.write().await;
        connections.remove(player_id);
    }

    async fn send_to_player(&self, player_id: &PlayerId, message: &str) {
        let connections = self.connections.read().await;
        if let Some(sender) = connections.get(player_id) {
            let _ = sender.send(message.to_string());
        }
    }

    async fn send_to_players(&self, player_ids: &[PlayerId], message: &str) {
        let connections = self.connections.read().await;
        for player_id in player_ids {
            if let Some(sender) = connections.get(player_id) {
                let _ = sender.send(message.to_string());
            }
        }
    }
}
