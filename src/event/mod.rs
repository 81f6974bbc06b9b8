// Room-scoped event plumbing.
//
// Each room gets its own broadcast channel. Handlers subscribe per room and
// receive every event in publish order on a single task.

pub use bus::EventBus;
pub use events::RoomEvent;
pub use room_handler::{RoomEventError, RoomEventHandler};
pub use room_subscription::RoomSubscription;

mod bus;
mod events;
mod room_handler;
mod room_subscription;
