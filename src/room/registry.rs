use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::models::RoomCode;
use crate::game::{DeckSource, GameSession, PlayerId, Rules, SessionError, ShuffledDeck, Step};
use crate::shared::lock;

pub type SharedSession = Arc<Mutex<GameSession>>;

/// Builds the deck source for each new room.
pub type DeckFactory = Arc<dyn Fn() -> Box<dyn DeckSource> + Send + Sync>;

/// A live room. Clones share the same session.
#[derive(Clone)]
pub struct RoomHandle {
    /// Unique per room instance; event channels are keyed by it.
    pub id: String,
    pub code: RoomCode,
    session: SharedSession,
    subscribers: Arc<OnceCell<()>>,
}

impl RoomHandle {
    fn new(code: RoomCode, session: GameSession) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            code,
            session: Arc::new(Mutex::new(session)),
            subscribers: Arc::new(OnceCell::new()),
        }
    }

    /// Locks the session. Never hold the guard across an await.
    pub fn session(&self) -> MutexGuard<'_, GameSession> {
        lock(&self.session)
    }

    /// Runs `start` the first time it is called for this room; later callers
    /// wait for that first run to finish.
    pub async fn start_subscribers_once<F, Fut>(&self, start: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        self.subscribers.get_or_init(start).await;
    }
}

impl fmt::Debug for RoomHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomHandle")
            .field("id", &self.id)
            .field("code", &self.code)
            .finish()
    }
}

#[derive(Debug)]
pub struct JoinedRoom {
    pub room: RoomHandle,
    pub player_id: PlayerId,
    /// What the join produced: room state, and the deal on the fourth seat.
    pub outcome: Step,
    /// Session epoch right after the join, to detect a superseded outcome.
    pub epoch: u64,
}

/// Maps room codes to live rooms for the lifetime of the process.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomCode, RoomHandle>>,
    rules: Rules,
    deck_factory: DeckFactory,
}

impl RoomRegistry {
    pub fn new(rules: Rules) -> Self {
        Self::with_deck_factory(
            rules,
            Arc::new(|| Box::new(ShuffledDeck) as Box<dyn DeckSource>),
        )
    }

    pub fn with_deck_factory(rules: Rules, deck_factory: DeckFactory) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            rules,
            deck_factory,
        }
    }

    fn create_room(&self, code: &RoomCode) -> RoomHandle {
        let room = RoomHandle::new(
            code.clone(),
            GameSession::with_deck(self.rules, (self.deck_factory)()),
        );
        info!(code = %code, room_id = %room.id, "Room created");
        room
    }

    #[instrument(skip(self))]
    pub fn get_or_create(&self, code: &RoomCode) -> RoomHandle {
        let mut rooms = lock(&self.rooms);
        rooms
            .entry(code.clone())
            .or_insert_with(|| self.create_room(code))
            .clone()
    }

    pub fn get(&self, code: &RoomCode) -> Option<RoomHandle> {
        lock(&self.rooms).get(code).cloned()
    }

    /// Seats `name` in the room, creating the room if needed. Lookup and join
    /// happen under one lock, so a room cannot be removed in between.
    #[instrument(skip(self))]
    pub fn join(&self, code: &RoomCode, name: &str) -> Result<JoinedRoom, SessionError> {
        let mut rooms = lock(&self.rooms);
        let room = rooms
            .entry(code.clone())
            .or_insert_with(|| self.create_room(code))
            .clone();

        let joined = {
            let mut session = room.session();
            session
                .join(name)
                .map(|(player_id, outcome)| (player_id, outcome, session.epoch()))
        };
        match joined {
            Ok((player_id, outcome, epoch)) => {
                info!(code = %code, room_id = %room.id, player_id = %player_id, "Player seated");
                Ok(JoinedRoom {
                    room,
                    player_id,
                    outcome,
                    epoch,
                })
            }
            Err(e) => {
                debug!(code = %code, error = %e, "Join refused");
                Err(e)
            }
        }
    }

    /// Removes the room if it is still the instance `room_id` and has no
    /// players left.
    #[instrument(skip(self))]
    pub fn remove_if_empty(&self, code: &RoomCode, room_id: &str) -> bool {
        let mut rooms = lock(&self.rooms);
        let Some(room) = rooms.get(code) else {
            return false;
        };
        if room.id != room_id || !room.session().is_empty() {
            return false;
        }

        rooms.remove(code);
        info!(code = %code, room_id = %room_id, "Room destroyed");
        true
    }

    pub fn room_count(&self) -> usize {
        lock(&self.rooms).len()
    }
}
