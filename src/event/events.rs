use crate::game::{Card, Envelope, PlayerId, Step};

/// Events published on a room's channel.
///
/// Inbound events carry player intent into the game handler; `Outbound`
/// carries session output toward the connections.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    /// A player took a seat. `outcome` is what the join produced, valid
    /// while the session is still at `epoch`.
    PlayerJoined {
        player_id: PlayerId,
        outcome: Step,
        epoch: u64,
    },

    TryPlayCard { player_id: PlayerId, card: Card },

    ChatMessage { player_id: PlayerId, text: String },

    PlayerDisconnected { player_id: PlayerId },

    Outbound(Envelope),
}

impl RoomEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            RoomEvent::PlayerJoined { .. } => "player_joined",
            RoomEvent::TryPlayCard { .. } => "try_play_card",
            RoomEvent::ChatMessage { .. } => "chat_message",
            RoomEvent::PlayerDisconnected { .. } => "player_disconnected",
            RoomEvent::Outbound(_) => "outbound",
        }
    }
}
