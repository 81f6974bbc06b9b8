// Public API
pub use cards::{Card, CardError, Rank, Suit};
pub use deck::{DeckSource, ShuffledDeck};
#[cfg(any(test, feature = "test-utils"))]
pub use deck::PresetDeck;
pub use game_room_subscriber::GameRoomSubscriber;
pub use scoring::RoundScore;
pub use session::{
    Audience, Envelope, GameSession, Pacing, Pending, Phase, Player, PlayerId, Round, Rules,
    ScoreLine, SeatSummary, SessionError, SessionEvent, Step, Transition, SEATS,
};
pub use trick::{Play, PlayRule};

pub mod cards;
pub mod deck;
mod game_room_subscriber;
pub mod scoring;
pub mod session;
pub mod trick;
