use rand::seq::SliceRandom;
use rand::Rng;

use super::cards::Card;

pub const HAND_SIZE: usize = 13;

/// Source of decks for successive deals in a room.
pub trait DeckSource: Send {
    /// Returns the next 52-card sequence to deal from.
    fn next_deck(&mut self) -> Vec<Card>;
}

/// Builds the 52-card set and applies a uniform random permutation.
pub fn new_shuffled_deck() -> Vec<Card> {
    shuffled_with(&mut rand::rng())
}

pub fn shuffled_with<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut cards = Card::all_cards();
    // Fisher-Yates
    cards.shuffle(rng);
    cards
}

/// Splits a deck into four contiguous 13-card hands in seat order.
pub fn deal(deck: &[Card]) -> [Vec<Card>; 4] {
    std::array::from_fn(|seat| {
        deck.iter()
            .skip(seat * HAND_SIZE)
            .take(HAND_SIZE)
            .copied()
            .collect()
    })
}

#[derive(Debug, Default)]
pub struct ShuffledDeck;

impl DeckSource for ShuffledDeck {
    fn next_deck(&mut self) -> Vec<Card> {
        new_shuffled_deck()
    }
}

/// Replays predetermined decks in order, falling back to shuffled decks
/// once they run out. Scripts deals in tests.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct PresetDeck {
    decks: std::collections::VecDeque<Vec<Card>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl PresetDeck {
    pub fn new(decks: Vec<Vec<Card>>) -> Self {
        Self {
            decks: decks.into(),
        }
    }

    /// Builds a deck that deals exactly the given hands, seat by seat.
    /// Cards not named in any hand fill the remaining slots.
    pub fn from_hands(hands: [Vec<Card>; 4]) -> Vec<Card> {
        let mut rest: Vec<Card> = Card::all_cards()
            .into_iter()
            .filter(|card| !hands.iter().any(|hand| hand.contains(card)))
            .collect();

        let mut deck = Vec::with_capacity(52);
        for hand in hands {
            let missing = HAND_SIZE.saturating_sub(hand.len());
            deck.extend(hand.into_iter().take(HAND_SIZE));
            deck.extend(rest.drain(..missing.min(rest.len())));
        }
        deck
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl DeckSource for PresetDeck {
    fn next_deck(&mut self) -> Vec<Card> {
        self.decks.pop_front().unwrap_or_else(new_shuffled_deck)
    }
}
