// Public API
pub use models::{RoomCode, RoomCodeError, RoomStatus};
pub use registry::{DeckFactory, JoinedRoom, RoomHandle, RoomRegistry, SharedSession};

// Internal modules
pub mod models;
pub mod registry;
