//! Special-card table and round scoring.
//!
//! Sixteen cards carry an effect: every Heart is a penalty (Ace -50 down to
//! -10 for the low Hearts), the Queen of Spades is -100, the Jack of Diamonds
//! is +100 and the Ten of Clubs doubles its collector's base score.

use serde::Serialize;

use super::cards::{Card, Rank, Suit};

pub const QUEEN_OF_SPADES: Card = Card::new(Rank::Queen, Suit::Spades);
pub const JACK_OF_DIAMONDS: Card = Card::new(Rank::Jack, Suit::Diamonds);
pub const TEN_OF_CLUBS: Card = Card::new(Rank::Ten, Suit::Clubs);

pub const SPECIAL_CARD_COUNT: usize = 16;

const SWEEP_BONUS: i32 = 500;
const PIG_AND_SHEEP_BONUS: i32 = 200;
const LONE_DOUBLER_BONUS: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialEffect {
    Points(i32),
    Doubler,
}

/// The effect of `card`, if it is one of the special cards.
pub fn special_effect(card: Card) -> Option<SpecialEffect> {
    if card == TEN_OF_CLUBS {
        return Some(SpecialEffect::Doubler);
    }
    if card == QUEEN_OF_SPADES {
        return Some(SpecialEffect::Points(-100));
    }
    if card == JACK_OF_DIAMONDS {
        return Some(SpecialEffect::Points(100));
    }
    if card.suit != Suit::Hearts {
        return None;
    }

    let points = match card.rank {
        Rank::Ace => -50,
        Rank::King => -40,
        Rank::Queen => -30,
        Rank::Jack => -20,
        _ => -10,
    };
    Some(SpecialEffect::Points(points))
}

pub fn is_special(card: Card) -> bool {
    special_effect(card).is_some()
}

/// Point value of a card; the doubler and plain cards are worth nothing.
pub fn point_value(card: Card) -> i32 {
    match special_effect(card) {
        Some(SpecialEffect::Points(points)) => points,
        _ => 0,
    }
}

/// Sum of point values over `cards`, used for live trick totals.
pub fn points_of<'a>(cards: impl IntoIterator<Item = &'a Card>) -> i32 {
    cards.into_iter().map(|card| point_value(*card)).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RoundScore {
    pub base: i32,
    pub bonus: i32,
    pub doubled: bool,
    pub total: i32,
}

/// Scores the cards one player collected over a completed round.
///
/// The bonuses are mutually exclusive and checked in order: all sixteen
/// specials (+500), exactly the Jack of Diamonds and Queen of Spades (+200),
/// exactly the Ten of Clubs (+50). The doubler applies to the base only.
pub fn score_collected(collected: &[Card]) -> RoundScore {
    let mut specials: Vec<Card> = collected.iter().copied().filter(|c| is_special(*c)).collect();
    specials.sort();
    specials.dedup();

    let doubled = specials.contains(&TEN_OF_CLUBS);
    let mut base = points_of(&specials);

    let bonus = if specials.len() == SPECIAL_CARD_COUNT {
        SWEEP_BONUS
    } else if specials.len() == 2
        && specials.contains(&JACK_OF_DIAMONDS)
        && specials.contains(&QUEEN_OF_SPADES)
    {
        PIG_AND_SHEEP_BONUS
    } else if specials.len() == 1 && doubled {
        LONE_DOUBLER_BONUS
    } else {
        0
    };

    if doubled {
        base *= 2;
    }

    RoundScore {
        base,
        bonus,
        doubled,
        total: base + bonus,
    }
}
