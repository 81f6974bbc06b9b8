use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::RoomEvent;

const ROOM_CAPACITY: usize = 256;

/// Per-room broadcast channels, keyed by room instance id.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    room_channels: Arc<RwLock<HashMap<String, broadcast::Sender<RoomEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes to every subscriber of the room. Events for a room with no
    /// channel are dropped.
    pub async fn emit_to_room(&self, room_id: &str, event: RoomEvent) {
        let room_channels = self.room_channels.read().await;

        let Some(sender) = room_channels.get(room_id) else {
            debug!(room_id = %room_id, event_type = event.event_type(), "No room channel, event dropped");
            return;
        };

        match sender.send(event) {
            Ok(receivers) => {
                debug!(room_id = %room_id, receivers, "Room event emitted");
            }
            Err(_) => {
                debug!(room_id = %room_id, "Room event emitted with no receivers");
            }
        }
    }

    pub async fn subscribe_to_room(&self, room_id: &str) -> broadcast::Receiver<RoomEvent> {
        if let Some(sender) = self.room_channels.read().await.get(room_id) {
            return sender.subscribe();
        }

        let mut room_channels = self.room_channels.write().await;
        room_channels
            .entry(room_id.to_string())
            .or_insert_with(|| {
                debug!(room_id = %room_id, "Creating room channel");
                broadcast::channel(ROOM_CAPACITY).0
            })
            .subscribe()
    }

    /// Drops the room's channel; its subscriptions end once drained.
    pub async fn remove_room(&self, room_id: &str) -> bool {
        let removed = self.room_channels.write().await.remove(room_id).is_some();
        if removed {
            debug!(room_id = %room_id, "Room channel removed");
        }
        removed
    }

    pub async fn has_room(&self, room_id: &str) -> bool {
        self.room_channels.read().await.contains_key(room_id)
    }
}
