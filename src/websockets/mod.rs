// Public API
pub use connection_manager::{ConnectionManager, InMemoryConnectionManager};
pub use handler::{
    admit_player, display_name, release_player, websocket_handler, JoinParams, Seat,
    WebsocketReceiveHandler, MAX_CHAT_CHARS,
};
pub use messages::{ClientMessage, MessageParseError, MessageType, WebSocketMessage};
pub use socket::{Connection, MessageHandler, SocketError, SocketWrapper};
pub use websocket_room_subscriber::WebSocketRoomSubscriber;

// Internal modules
mod connection_manager;
mod handler;
pub mod messages;
mod socket;
mod websocket_room_subscriber;
