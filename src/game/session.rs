// The per-room game session: who sits where, what they hold, the trick in
// progress and the running scores.
//
// The session is a plain state machine. Every operation returns a `Step`: the
// events to deliver and, optionally, the one transition that should run after
// a pacing delay. While a transition is pending, plays are refused, so at most
// one step is ever in flight for a room.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use super::cards::{Card, Suit};
use super::deck::{self, DeckSource, ShuffledDeck};
use super::scoring::{self, RoundScore};
use super::trick::{self, Play, PlayRule};

pub const SEATS: usize = 4;
pub const TRICKS_PER_ROUND: u8 = 13;
pub const DEFAULT_LOSING_SCORE: i32 = -1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Not your turn")]
    NotYourTurn,
    #[error("Card not in hand: {0}")]
    CardNotInHand(Card),
    #[error("Must follow suit: {0}")]
    MustFollowSuit(Suit),
    #[error("Not accepting plays right now")]
    NotAcceptingPlays,
    #[error("Wait for the table to settle")]
    TransitionPending,
    #[error("Room is full")]
    RoomFull,
    #[error("Game already in progress")]
    GameInProgress,
    #[error("Game is over")]
    GameFinished,
    #[error("Unknown player")]
    UnknownPlayer,
}

/// Delays between paced transitions, so players can see the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After a card is played, before the next player is prompted.
    pub after_play: Duration,
    /// After the fourth card, before the trick is resolved.
    pub before_resolve: Duration,
    /// After a trick is resolved, before the next lead or the round settlement.
    pub after_resolve: Duration,
    /// After a deal, before the first player is prompted.
    pub after_deal: Duration,
    /// After a round summary, before the next deal.
    pub between_rounds: Duration,
}

impl Pacing {
    pub fn immediate() -> Self {
        Self {
            after_play: Duration::ZERO,
            before_resolve: Duration::ZERO,
            after_resolve: Duration::ZERO,
            after_deal: Duration::ZERO,
            between_rounds: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            after_play: Duration::from_millis(300),
            before_resolve: Duration::from_millis(1000),
            after_resolve: Duration::from_millis(1500),
            after_deal: Duration::from_millis(1000),
            between_rounds: Duration::from_millis(3000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub play_rule: PlayRule,
    /// The game ends once any total falls to this score or below.
    pub losing_score: i32,
    pub pacing: Pacing,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            play_rule: PlayRule::default(),
            losing_score: DEFAULT_LOSING_SCORE,
            pacing: Pacing::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,
    /// Cards won in tricks this round.
    pub collected: Vec<Card>,
    /// Running total across rounds of this game.
    pub total_score: i32,
}

impl Player {
    fn new(id: PlayerId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            hand: vec![],
            collected: vec![],
            total_score: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Round {
    /// Completed tricks this round, 0 to 13.
    pub trick_number: u8,
    pub lead_suit: Option<Suit>,
    pub current_trick: Vec<Play>,
    pub current_player: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WaitingForPlayers,
    Dealt,
    AwaitingPlay { seat: usize },
    TrickComplete,
    RoundComplete,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    NotifyTurn,
    ResolveTrick,
    CompleteRound,
    StartRound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    pub transition: Transition,
    pub delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// The players seated when the event was produced.
    Seated(Vec<PlayerId>),
    Player(PlayerId),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatSummary {
    pub name: String,
    pub score: i32,
    pub is_turn: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreLine {
    pub seat: usize,
    pub name: String,
    pub round: RoundScore,
    pub total: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    RoomState {
        players: Vec<SeatSummary>,
        seat: usize,
        is_host: bool,
    },
    GameStarted {
        round: u32,
        players: Vec<String>,
    },
    HandDealt {
        hand: Vec<Card>,
    },
    YourTurn {
        seat: usize,
        name: String,
        lead_suit: Option<Suit>,
    },
    CardPlayed {
        seat: usize,
        name: String,
        card: Card,
        lead_suit: Suit,
        running_trick_points: i32,
    },
    TrickResolved {
        trick_number: u8,
        winner_seat: usize,
        winner_name: String,
        points: i32,
    },
    RoundSummary {
        scores: Vec<ScoreLine>,
        game_over: bool,
        /// Seats sharing the highest total when the game ends.
        winners: Vec<usize>,
    },
    RoundAborted {
        reason: String,
    },
    PlayerLeft {
        name: String,
        player_count: usize,
    },
    Rejected {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub audience: Audience,
    pub event: SessionEvent,
}

impl Envelope {
    pub fn to_all(players: Vec<PlayerId>, event: SessionEvent) -> Self {
        Self {
            audience: Audience::Seated(players),
            event,
        }
    }

    pub fn to(player: PlayerId, event: SessionEvent) -> Self {
        Self {
            audience: Audience::Player(player),
            event,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    pub events: Vec<Envelope>,
    pub pending: Option<Pending>,
}

impl Step {
    fn from_events(events: Vec<Envelope>) -> Self {
        Self {
            events,
            pending: None,
        }
    }

    fn merge(&mut self, next: Step) {
        self.events.extend(next.events);
        self.pending = next.pending;
    }
}

pub struct GameSession {
    players: Vec<Player>, // seat order; seat 0 hosts
    round: Round,
    phase: Phase,
    pending: Option<Pending>,
    rounds_dealt: u32,
    /// Bumped whenever the seating or the deal changes.
    epoch: u64,
    rules: Rules,
    deck: Box<dyn DeckSource>,
}

impl GameSession {
    pub fn new(rules: Rules) -> Self {
        Self::with_deck(rules, Box::new(ShuffledDeck))
    }

    pub fn with_deck(rules: Rules, deck: Box<dyn DeckSource>) -> Self {
        Self {
            players: Vec::with_capacity(SEATS),
            round: Round::default(),
            phase: Phase::WaitingForPlayers,
            pending: None,
            rounds_dealt: 0,
            epoch: 0,
            rules,
            deck,
        }
    }

    /// Seats a new player. The fourth player starts the game.
    pub fn join(&mut self, name: &str) -> Result<(PlayerId, Step), SessionError> {
        if self.players.len() >= SEATS {
            return Err(SessionError::RoomFull);
        }
        match self.phase {
            Phase::WaitingForPlayers => {}
            Phase::GameOver => return Err(SessionError::GameFinished),
            _ => return Err(SessionError::GameInProgress),
        }

        let id = PlayerId::new();
        self.players.push(Player::new(id, name));
        self.epoch += 1;

        let mut step = Step::from_events(self.room_state_events());
        if self.players.len() == SEATS {
            step.merge(self.start_game());
        }
        Ok((id, step))
    }

    /// Removes a player. Leaving mid-game aborts the round in progress: no
    /// scores from it are applied and the room waits for a fourth player.
    pub fn leave(&mut self, player: &PlayerId) -> Result<Step, SessionError> {
        let seat = self.seat_of(player).ok_or(SessionError::UnknownPlayer)?;
        let departed = self.players.remove(seat);
        self.epoch += 1;

        let mut events = vec![];
        if !matches!(self.phase, Phase::WaitingForPlayers | Phase::GameOver) {
            self.abort_round();
            events.push(self.broadcast(SessionEvent::RoundAborted {
                reason: format!("{} left the table", departed.name),
            }));
        }

        events.push(self.broadcast(SessionEvent::PlayerLeft {
            name: departed.name,
            player_count: self.players.len(),
        }));
        if self.phase == Phase::WaitingForPlayers {
            events.extend(self.room_state_events());
        }

        Ok(Step::from_events(events))
    }

    pub fn play_card(&mut self, seat: usize, card: Card) -> Result<Step, SessionError> {
        let Phase::AwaitingPlay { seat: expected } = self.phase else {
            return Err(SessionError::NotAcceptingPlays);
        };
        if self.pending.is_some() {
            return Err(SessionError::TransitionPending);
        }
        if seat != expected {
            return Err(SessionError::NotYourTurn);
        }

        let player = self
            .players
            .get_mut(seat)
            .ok_or(SessionError::UnknownPlayer)?;
        let Some(pos) = player.hand.iter().position(|c| *c == card) else {
            return Err(SessionError::CardNotInHand(card));
        };
        if let Some(lead) = self.round.lead_suit {
            if !trick::is_legal_play(self.rules.play_rule, &player.hand, Some(lead), card) {
                return Err(SessionError::MustFollowSuit(lead));
            }
        }

        player.hand.remove(pos);
        let name = player.name.clone();
        self.round.current_trick.push(Play { seat, card });
        let lead_suit = *self.round.lead_suit.get_or_insert(card.suit);

        let events = vec![self.broadcast(SessionEvent::CardPlayed {
            seat,
            name,
            card,
            lead_suit,
            running_trick_points: scoring::points_of(
                self.round.current_trick.iter().map(|play| &play.card),
            ),
        })];

        if self.round.current_trick.len() == SEATS {
            self.phase = Phase::TrickComplete;
            Ok(self.schedule(
                events,
                Transition::ResolveTrick,
                self.rules.pacing.before_resolve,
            ))
        } else {
            let next = (seat + 1) % SEATS;
            self.round.current_player = next;
            self.phase = Phase::AwaitingPlay { seat: next };
            Ok(self.schedule(events, Transition::NotifyTurn, self.rules.pacing.after_play))
        }
    }

    /// Runs the pending transition, if it still applies.
    pub fn advance(&mut self) -> Step {
        let Some(pending) = self.pending.take() else {
            return Step::default();
        };
        if self.phase == Phase::GameOver || self.players.len() < SEATS {
            return Step::default();
        }

        match pending.transition {
            Transition::NotifyTurn => self.notify_turn(),
            Transition::ResolveTrick => self.resolve_trick(),
            Transition::CompleteRound => self.complete_round(),
            Transition::StartRound => self.start_game(),
        }
    }

    fn start_game(&mut self) -> Step {
        let deck = self.deck.next_deck();
        for (player, mut hand) in self.players.iter_mut().zip(deck::deal(&deck)) {
            hand.sort();
            player.hand = hand;
            player.collected.clear();
        }
        self.round = Round::default();
        self.phase = Phase::Dealt;
        self.rounds_dealt += 1;
        self.epoch += 1;

        let mut events = vec![self.broadcast(SessionEvent::GameStarted {
            round: self.rounds_dealt,
            players: self.players.iter().map(|p| p.name.clone()).collect(),
        })];
        events.extend(self.players.iter().map(|p| {
            Envelope::to(
                p.id,
                SessionEvent::HandDealt {
                    hand: p.hand.clone(),
                },
            )
        }));

        self.schedule(events, Transition::NotifyTurn, self.rules.pacing.after_deal)
    }

    fn notify_turn(&mut self) -> Step {
        let seat = self.round.current_player;
        self.phase = Phase::AwaitingPlay { seat };

        Step::from_events(vec![self.broadcast(SessionEvent::YourTurn {
            seat,
            name: self.name_at(seat),
            lead_suit: self.round.lead_suit,
        })])
    }

    fn resolve_trick(&mut self) -> Step {
        let Some(lead_suit) = self.round.lead_suit else {
            return Step::default();
        };
        let Some(winner) = trick::resolve_trick(&self.round.current_trick, lead_suit) else {
            return Step::default();
        };

        let cards: Vec<Card> = self.round.current_trick.drain(..).map(|p| p.card).collect();
        let points = scoring::points_of(&cards);
        if let Some(player) = self.players.get_mut(winner) {
            player.collected.extend(cards);
        }
        self.round.trick_number += 1;
        self.round.lead_suit = None;

        let events = vec![self.broadcast(SessionEvent::TrickResolved {
            trick_number: self.round.trick_number,
            winner_seat: winner,
            winner_name: self.name_at(winner),
            points,
        })];

        if self.round.trick_number >= TRICKS_PER_ROUND {
            self.phase = Phase::RoundComplete;
            self.schedule(
                events,
                Transition::CompleteRound,
                self.rules.pacing.after_resolve,
            )
        } else {
            self.round.current_player = winner;
            self.phase = Phase::AwaitingPlay { seat: winner };
            self.schedule(events, Transition::NotifyTurn, self.rules.pacing.after_resolve)
        }
    }

    fn complete_round(&mut self) -> Step {
        let scores: Vec<ScoreLine> = self
            .players
            .iter_mut()
            .enumerate()
            .map(|(seat, player)| {
                let round = scoring::score_collected(&player.collected);
                player.total_score += round.total;
                ScoreLine {
                    seat,
                    name: player.name.clone(),
                    round,
                    total: player.total_score,
                }
            })
            .collect();

        let game_over = self
            .players
            .iter()
            .any(|p| p.total_score <= self.rules.losing_score);
        let winners = if game_over { self.leaders() } else { vec![] };

        let events = vec![self.broadcast(SessionEvent::RoundSummary {
            scores,
            game_over,
            winners,
        })];

        if game_over {
            self.phase = Phase::GameOver;
            self.pending = None;
            Step::from_events(events)
        } else {
            self.phase = Phase::RoundComplete;
            self.schedule(
                events,
                Transition::StartRound,
                self.rules.pacing.between_rounds,
            )
        }
    }

    fn abort_round(&mut self) {
        self.pending = None;
        self.round = Round::default();
        self.phase = Phase::WaitingForPlayers;
        for player in &mut self.players {
            player.hand.clear();
            player.collected.clear();
        }
    }

    fn schedule(&mut self, events: Vec<Envelope>, transition: Transition, delay: Duration) -> Step {
        let pending = Pending { transition, delay };
        self.pending = Some(pending);
        Step {
            events,
            pending: Some(pending),
        }
    }

    fn broadcast(&self, event: SessionEvent) -> Envelope {
        Envelope::to_all(self.player_ids(), event)
    }

    fn room_state_events(&self) -> Vec<Envelope> {
        let players: Vec<SeatSummary> = self
            .players
            .iter()
            .enumerate()
            .map(|(seat, p)| SeatSummary {
                name: p.name.clone(),
                score: p.total_score,
                is_turn: self.phase == Phase::AwaitingPlay { seat },
            })
            .collect();

        self.players
            .iter()
            .enumerate()
            .map(|(seat, p)| {
                Envelope::to(
                    p.id,
                    SessionEvent::RoomState {
                        players: players.clone(),
                        seat,
                        is_host: seat == 0,
                    },
                )
            })
            .collect()
    }

    /// Seats holding the strictly highest total; more than one on a tie.
    fn leaders(&self) -> Vec<usize> {
        let Some(best) = self.players.iter().map(|p| p.total_score).max() else {
            return vec![];
        };
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.total_score == best)
            .map(|(seat, _)| seat)
            .collect()
    }

    fn name_at(&self, seat: usize) -> String {
        self.players
            .get(seat)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    /// Changes whenever a player joins or leaves or cards are dealt. Output
    /// computed off the room's task is stale once this has moved on.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn pending(&self) -> Option<Pending> {
        self.pending
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn seat_of(&self, player: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == *player)
    }

    pub fn player_name(&self, player: &PlayerId) -> Option<&str> {
        self.players
            .iter()
            .find(|p| p.id == *player)
            .map(|p| p.name.as_str())
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    /// Cards held, collected or on the table. Always 52 once dealt.
    pub fn cards_in_play(&self) -> usize {
        self.players
            .iter()
            .map(|p| p.hand.len() + p.collected.len())
            .sum::<usize>()
            + self.round.current_trick.len()
    }
}
