// Library crate for the gongzhu game server
// This file exposes the public API for integration tests

pub mod config;
pub mod event;
pub mod game;
pub mod room;
pub mod router;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::Config;
pub use event::{EventBus, RoomEvent, RoomSubscription};
pub use game::{GameSession, PlayerId, Rules};
pub use room::{RoomCode, RoomRegistry};
pub use router::build_router;
pub use shared::{AppError, AppState};
pub use websockets::{
    ConnectionManager, MessageHandler, MessageType, WebSocketMessage, WebSocketRoomSubscriber,
    WebsocketReceiveHandler,
};
