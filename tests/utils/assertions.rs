//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;

use gongzhu::websockets::{MessageType, WebSocketMessage};

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    players: Vec<String>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for all seated players
    pub fn for_all_players(setup: &'a TestSetup) -> Self {
        Self {
            setup,
            players: setup.names(),
        }
    }

    /// Create an assertion for specific players
    pub fn for_players(setup: &'a TestSetup, players: Vec<&str>) -> Self {
        Self {
            setup,
            players: players.into_iter().map(|s| s.to_string()).collect(),
        }
    }

    async fn next_message(&self, player: &str) -> Option<WebSocketMessage> {
        let raw = self
            .setup
            .mock_conn_manager
            .consume_message_for(&self.setup.player_id(player))
            .await?;
        Some(serde_json::from_str(&raw).unwrap_or_else(|e| panic!("bad frame {}: {}", raw, e)))
    }

    /// Assert that the next unread message of each player has the given type
    /// and, except for private hands, the same payload (consumes it)
    pub async fn received_message_type(self, expected_type: MessageType) -> MessageContent {
        let mut messages = vec![];

        for player in &self.players {
            let message = self.next_message(player).await;
            let message =
                message.unwrap_or_else(|| panic!("{} should have received a message", player));
            assert_eq!(
                message.message_type, expected_type,
                "{} received wrong message type",
                player
            );
            messages.push(message);
        }

        let private = matches!(
            expected_type,
            MessageType::HandDealt | MessageType::RoomJoined
        );
        if !private {
            for (i, message) in messages.iter().enumerate().skip(1) {
                assert_eq!(
                    message.payload, messages[0].payload,
                    "Player {} payload differs from player {}",
                    self.players[i], self.players[0]
                );
            }
        }

        MessageContent {
            payload: messages[0].payload.clone(),
        }
    }

    /// Assert that players received a sequence of message types in order (consumes them)
    pub async fn received_message_sequence(
        self,
        expected_types: Vec<MessageType>,
    ) -> Vec<MessageContent> {
        let mut result_messages = vec![];

        for player in &self.players {
            for (i, expected_type) in expected_types.iter().enumerate() {
                let message = self.next_message(player).await.unwrap_or_else(|| {
                    panic!("{} is missing message {} ({:?})", player, i, expected_type)
                });
                assert_eq!(
                    message.message_type, *expected_type,
                    "{} message {} has wrong type",
                    player, i
                );

                if player == &self.players[0] {
                    result_messages.push(MessageContent {
                        payload: message.payload,
                    });
                }
            }
        }

        result_messages
    }

    /// Assert that players have no unread messages
    pub async fn received_no_messages(self) {
        for player in &self.players {
            let messages = self
                .setup
                .mock_conn_manager
                .get_messages_for(&self.setup.player_id(player))
                .await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                player,
                messages
            );
        }
    }

    /// Count unread messages of a type for a player (non-consuming)
    pub async fn count_message_type(&self, player: &str, message_type: MessageType) -> usize {
        self.unread_of_type(player, message_type).await.len()
    }

    /// Unread messages of a type for a player (non-consuming)
    pub async fn unread_of_type(&self, player: &str, message_type: MessageType) -> Vec<Value> {
        self.setup
            .mock_conn_manager
            .get_messages_for(&self.setup.player_id(player))
            .await
            .iter()
            .filter_map(|raw| serde_json::from_str::<WebSocketMessage>(raw).ok())
            .filter(|message| message.message_type == message_type)
            .map(|message| message.payload)
            .collect()
    }
}

// ============================================================================
// Message Content Assertions
// ============================================================================

pub struct MessageContent {
    pub payload: Value,
}

impl MessageContent {
    pub fn with_field(self, key: &str, expected: impl Into<Value>) -> Self {
        assert_eq!(self.payload[key], expected.into(), "field {}", key);
        self
    }

    pub fn with_name(self, expected: &str) -> Self {
        self.with_field("name", expected)
    }

    pub fn with_seat(self, expected: usize) -> Self {
        self.with_field("seat", expected)
    }

    pub fn with_card(self, expected: &str) -> Self {
        self.with_field("card", expected)
    }

    pub fn with_message(self, expected: &str) -> Self {
        self.with_field("message", expected)
    }

    pub fn with_hand_size(self, expected: usize) -> Self {
        let hand = self.payload["hand"]
            .as_array()
            .unwrap_or_else(|| panic!("no hand in {}", self.payload));
        assert_eq!(hand.len(), expected);
        self
    }
}
