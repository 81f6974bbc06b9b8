#![allow(dead_code)]

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use gongzhu::{
    game::{Card, DeckSource, Pacing, PresetDeck, Rules},
    room::RoomHandle,
    shared::AppError,
    websockets::{admit_player, Seat},
    AppState, EventBus, PlayerId, RoomRegistry, WebsocketReceiveHandler,
};

use super::mocks::MockConnectionManager;

pub const ROOM_CODE: &str = "123456";

/// Time allowed for room subscriptions to process an action.
pub const SETTLE: Duration = Duration::from_millis(20);

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app_state: AppState,
    pub event_bus: EventBus,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    pub input_handler: WebsocketReceiveHandler,
    /// Seated players by name, in seat order at setup time.
    pub players: Vec<(String, Seat)>,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    rules: Rules,
    hands: Option<[Vec<Card>; 4]>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            rules: Rules {
                pacing: Pacing::immediate(),
                ..Rules::default()
            },
            hands: None,
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["alice", "bob"])
    }

    pub fn with_four_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "carol", "dave"])
    }

    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = Rules {
            pacing: Pacing::immediate(),
            ..rules
        };
        self
    }

    /// Scripts the first deal; tokens are listed per seat.
    pub fn with_hands(mut self, hands: [Vec<&str>; 4]) -> Self {
        self.hands = Some(hands.map(|tokens| {
            tokens
                .into_iter()
                .map(|t| Card::from_token(t).unwrap())
                .collect()
        }));
        self
    }

    pub async fn build(self) -> TestSetup {
        let hands = self.hands;
        let registry = RoomRegistry::with_deck_factory(
            self.rules,
            Arc::new(move || {
                let decks = hands
                    .clone()
                    .map(|h| vec![PresetDeck::from_hands(h)])
                    .unwrap_or_default();
                Box::new(PresetDeck::new(decks)) as Box<dyn DeckSource>
            }),
        );

        let mock_conn_manager = Arc::new(MockConnectionManager::new());
        let event_bus = EventBus::new();
        let app_state = AppState::new(
            Arc::new(registry),
            mock_conn_manager.clone(),
            event_bus.clone(),
        );

        let mut setup = TestSetup {
            input_handler: WebsocketReceiveHandler::new(event_bus.clone()),
            app_state,
            event_bus,
            mock_conn_manager,
            players: vec![],
        };

        for name in &self.players {
            setup.join(name).await.unwrap();
        }

        setup
    }
}

impl TestSetup {
    /// Seats a player the way the websocket handler does.
    pub async fn join(&mut self, name: &str) -> Result<PlayerId, AppError> {
        let seat = self.try_admit(ROOM_CODE, name).await?;
        let player_id = seat.player_id;
        self.players.push((name.to_string(), seat));
        Ok(player_id)
    }

    pub async fn try_admit(&self, code: &str, name: &str) -> Result<Seat, AppError> {
        let (sender, _receiver) = mpsc::unbounded_channel();
        let seat = admit_player(&self.app_state, code, name, sender).await;
        sleep(SETTLE).await;
        seat
    }

    pub fn seat(&self, name: &str) -> &Seat {
        self.players
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, seat)| seat)
            .unwrap_or_else(|| panic!("{} is not seated", name))
    }

    pub fn player_id(&self, name: &str) -> PlayerId {
        self.seat(name).player_id
    }

    pub fn room(&self) -> RoomHandle {
        self.players
            .first()
            .map(|(_, seat)| seat.room.clone())
            .expect("no players seated")
    }

    pub fn names(&self) -> Vec<String> {
        self.players.iter().map(|(name, _)| name.clone()).collect()
    }
}
