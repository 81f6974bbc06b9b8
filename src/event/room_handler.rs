use async_trait::async_trait;
use thiserror::Error;

use super::events::RoomEvent;

#[derive(Debug, Error)]
pub enum RoomEventError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Handler error: {0}")]
    HandlerError(String),
}

/// A component reacting to the events of one room.
#[async_trait]
pub trait RoomEventHandler: Send + Sync {
    async fn handle_room_event(&self, room_id: &str, event: RoomEvent)
        -> Result<(), RoomEventError>;

    /// Name used in logs.
    fn handler_name(&self) -> &'static str;
}
