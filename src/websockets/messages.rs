use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::game::{Card, ScoreLine, SeatSummary, SessionEvent, Suit};

/// Message types for WebSocket communication
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    // Both directions
    Chat,

    // Client -> Server
    PlayCard,

    // Server -> Client
    RoomJoined,
    GameStart,
    HandDealt,
    YourTurn,
    CardPlayed,
    TrickEnd,
    RoundEnd,
    RoundAborted,
    PlayerLeft,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
}

/// Envelope of every frame: `{"type": ..., "payload": ..., "meta": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<WebSocketMessageMeta>,
}

/// Client-to-Server message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPayload {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayCardPayload {
    pub card: Card,
}

/// Server-to-Client message payloads
#[derive(Debug, Clone, Serialize)]
pub struct ChatBroadcastPayload {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomJoinedPayload {
    pub players: Vec<SeatSummary>,
    pub player_count: usize,
    pub seat: usize,
    pub is_host: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameStartPayload {
    pub round: u32,
    pub players: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HandDealtPayload {
    pub hand: Vec<Card>,
}

#[derive(Debug, Clone, Serialize)]
pub struct YourTurnPayload {
    pub seat: usize,
    pub name: String,
    pub lead_suit: Option<Suit>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardPlayedPayload {
    pub seat: usize,
    pub name: String,
    pub card: Card,
    pub lead_suit: Suit,
    pub running_trick_points: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrickEndPayload {
    pub trick_number: u8,
    pub winner_seat: usize,
    pub winner_name: String,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundEndPayload {
    pub scores: Vec<ScoreLine>,
    pub game_over: bool,
    pub winners: Vec<String>,
    /// Present only when a single seat holds the top total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundAbortedPayload {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerLeftPayload {
    pub name: String,
    pub player_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// A parsed inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Chat { text: String },
    PlayCard { card: Card },
}

#[derive(Debug, Error)]
pub enum MessageParseError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unsupported message type: {0:?}")]
    Unsupported(MessageType),
}

impl ClientMessage {
    pub fn parse(raw: &str) -> Result<Self, MessageParseError> {
        let message: WebSocketMessage = serde_json::from_str(raw)?;

        match message.message_type {
            MessageType::Chat => {
                let payload: ChatPayload = serde_json::from_value(message.payload)?;
                Ok(ClientMessage::Chat { text: payload.text })
            }
            MessageType::PlayCard => {
                let payload: PlayCardPayload = serde_json::from_value(message.payload)?;
                Ok(ClientMessage::PlayCard { card: payload.card })
            }
            other => Err(MessageParseError::Unsupported(other)),
        }
    }
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
            }),
        }
    }

    fn with_payload<P: Serialize>(message_type: MessageType, payload: P) -> Self {
        Self::new(
            message_type,
            serde_json::to_value(payload).unwrap_or_default(),
        )
    }

    pub fn chat(name: &str, text: &str) -> Self {
        Self::with_payload(
            MessageType::Chat,
            ChatBroadcastPayload {
                name: name.to_string(),
                text: text.to_string(),
            },
        )
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_payload(
            MessageType::Error,
            ErrorPayload {
                message: message.into(),
            },
        )
    }

    pub fn from_session_event(event: &SessionEvent) -> Self {
        match event {
            SessionEvent::RoomState {
                players,
                seat,
                is_host,
            } => Self::with_payload(
                MessageType::RoomJoined,
                RoomJoinedPayload {
                    player_count: players.len(),
                    players: players.clone(),
                    seat: *seat,
                    is_host: *is_host,
                },
            ),
            SessionEvent::GameStarted { round, players } => Self::with_payload(
                MessageType::GameStart,
                GameStartPayload {
                    round: *round,
                    players: players.clone(),
                },
            ),
            SessionEvent::HandDealt { hand } => {
                Self::with_payload(MessageType::HandDealt, HandDealtPayload { hand: hand.clone() })
            }
            SessionEvent::YourTurn {
                seat,
                name,
                lead_suit,
            } => Self::with_payload(
                MessageType::YourTurn,
                YourTurnPayload {
                    seat: *seat,
                    name: name.clone(),
                    lead_suit: *lead_suit,
                },
            ),
            SessionEvent::CardPlayed {
                seat,
                name,
                card,
                lead_suit,
                running_trick_points,
            } => Self::with_payload(
                MessageType::CardPlayed,
                CardPlayedPayload {
                    seat: *seat,
                    name: name.clone(),
                    card: *card,
                    lead_suit: *lead_suit,
                    running_trick_points: *running_trick_points,
                },
            ),
            SessionEvent::TrickResolved {
                trick_number,
                winner_seat,
                winner_name,
                points,
            } => Self::with_payload(
                MessageType::TrickEnd,
                TrickEndPayload {
                    trick_number: *trick_number,
                    winner_seat: *winner_seat,
                    winner_name: winner_name.clone(),
                    points: *points,
                },
            ),
            SessionEvent::RoundSummary {
                scores,
                game_over,
                winners,
            } => {
                let winners: Vec<String> = winners
                    .iter()
                    .filter_map(|seat| scores.iter().find(|line| line.seat == *seat))
                    .map(|line| line.name.clone())
                    .collect();
                let winner_name = match winners.as_slice() {
                    [only] => Some(only.clone()),
                    _ => None,
                };

                Self::with_payload(
                    MessageType::RoundEnd,
                    RoundEndPayload {
                        scores: scores.clone(),
                        game_over: *game_over,
                        winners,
                        winner_name,
                    },
                )
            }
            SessionEvent::RoundAborted { reason } => Self::with_payload(
                MessageType::RoundAborted,
                RoundAbortedPayload {
                    reason: reason.clone(),
                },
            ),
            SessionEvent::PlayerLeft { name, player_count } => Self::with_payload(
                MessageType::PlayerLeft,
                PlayerLeftPayload {
                    name: name.clone(),
                    player_count: *player_count,
                },
            ),
            SessionEvent::Rejected { reason } => Self::error(reason.clone()),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
