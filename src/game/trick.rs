use serde::Serialize;

use super::cards::{Card, Suit};

/// One card laid into the current trick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Play {
    pub seat: usize,
    pub card: Card,
}

/// Whether players must follow the lead suit when they can.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PlayRule {
    /// Any card in hand may be played.
    #[default]
    Free,
    /// A player holding the lead suit must play it.
    FollowSuit,
}

/// Returns the seat that wins the trick: the highest rank among plays in the
/// lead suit. There is no trump, so off-suit cards never win.
pub fn resolve_trick(plays: &[Play], lead_suit: Suit) -> Option<usize> {
    plays
        .iter()
        .filter(|play| play.card.suit == lead_suit)
        .max_by_key(|play| play.card.rank)
        .map(|play| play.seat)
}

/// Checks `card` against the play rule, given the player's hand and the lead
/// suit of the trick in progress (None when leading).
pub fn is_legal_play(rule: PlayRule, hand: &[Card], lead_suit: Option<Suit>, card: Card) -> bool {
    match (rule, lead_suit) {
        (PlayRule::Free, _) | (_, None) => true,
        (PlayRule::FollowSuit, Some(lead)) => {
            card.suit == lead || !hand.iter().any(|c| c.suit == lead)
        }
    }
}
