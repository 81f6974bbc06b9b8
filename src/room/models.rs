use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::game::{GameSession, Phase, SEATS};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomCodeError {
    #[error("Invalid room code: {0:?}")]
    Invalid(String),
}

/// A room code: exactly six ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    pub const LEN: usize = 6;

    pub fn parse(raw: &str) -> Result<Self, RoomCodeError> {
        if raw.len() == Self::LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(RoomCodeError::Invalid(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomCode {
    type Err = RoomCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of a room served by `GET /rooms/:code`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomStatus {
    pub code: RoomCode,
    pub players: Vec<String>,
    pub player_count: usize,
    pub phase: &'static str,
    pub accepting_players: bool,
}

impl RoomStatus {
    pub fn from_session(code: RoomCode, session: &GameSession) -> Self {
        let phase = session.phase();
        Self {
            code,
            players: session.players().iter().map(|p| p.name.clone()).collect(),
            player_count: session.player_count(),
            phase: phase_label(phase),
            accepting_players: phase == Phase::WaitingForPlayers && session.player_count() < SEATS,
        }
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::WaitingForPlayers => "waiting_for_players",
        Phase::Dealt => "dealt",
        Phase::AwaitingPlay { .. } => "awaiting_play",
        Phase::TrickComplete => "trick_complete",
        Phase::RoundComplete => "round_complete",
        Phase::GameOver => "game_over",
    }
}
