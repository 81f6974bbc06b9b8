use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{
    event::{EventBus, RoomEvent, RoomEventError, RoomEventHandler},
    game::{
        cards::Card,
        session::{Envelope, PlayerId, SessionError, SessionEvent, Step},
    },
    room::{RoomHandle, RoomRegistry},
};

/// Applies player intent to a room's session and plays out the paced
/// transitions that follow.
///
/// The subscription runs this handler on a single task, so while a delay is
/// being waited out, later events for the room queue behind it.
pub struct GameRoomSubscriber {
    room: RoomHandle,
    registry: Arc<RoomRegistry>,
    event_bus: EventBus,
}

#[async_trait]
impl RoomEventHandler for GameRoomSubscriber {
    async fn handle_room_event(
        &self,
        room_id: &str,
        event: RoomEvent,
    ) -> Result<(), RoomEventError> {
        match event {
            RoomEvent::PlayerJoined {
                player_id,
                outcome,
                epoch,
            } => {
                info!(room_id = %room_id, player_id = %player_id, "Player joined");
                self.handle_join(room_id, outcome, epoch).await;
            }
            RoomEvent::TryPlayCard { player_id, card } => {
                self.handle_play_card(room_id, player_id, card).await;
            }
            RoomEvent::PlayerDisconnected { player_id } => {
                self.handle_disconnect(room_id, player_id).await?;
            }
            RoomEvent::ChatMessage { .. } | RoomEvent::Outbound(_) => {}
        }

        Ok(())
    }

    fn handler_name(&self) -> &'static str {
        "GameRoomSubscriber"
    }
}

impl GameRoomSubscriber {
    pub fn new(room: RoomHandle, registry: Arc<RoomRegistry>, event_bus: EventBus) -> Self {
        Self {
            room,
            registry,
            event_bus,
        }
    }

    /// Joins are applied off this task, so a departure may already have
    /// been handled by the time the outcome arrives. That departure published
    /// a newer room state, and the superseded outcome is dropped.
    async fn handle_join(&self, room_id: &str, outcome: Step, epoch: u64) {
        let current = self.room.session().epoch();
        if current != epoch {
            debug!(room_id = %room_id, epoch, current, "Dropping superseded join outcome");
            return;
        }
        self.drive(outcome).await;
    }

    async fn handle_play_card(&self, room_id: &str, player_id: PlayerId, card: Card) {
        let result = {
            let mut session = self.room.session();
            match session.seat_of(&player_id) {
                Some(seat) => session.play_card(seat, card),
                None => Err(SessionError::UnknownPlayer),
            }
        };

        match result {
            Ok(step) => {
                debug!(room_id = %room_id, player_id = %player_id, card = %card, "Card played");
                self.drive(step).await;
            }
            Err(e) => {
                debug!(room_id = %room_id, player_id = %player_id, card = %card, error = %e, "Play rejected");
                self.publish(Envelope::to(
                    player_id,
                    SessionEvent::Rejected {
                        reason: e.to_string(),
                    },
                ))
                .await;
            }
        }
    }

    async fn handle_disconnect(
        &self,
        room_id: &str,
        player_id: PlayerId,
    ) -> Result<(), RoomEventError> {
        let left = self.room.session().leave(&player_id);
        let step = left.map_err(|e| {
            RoomEventError::HandlerError(format!("Failed to remove {}: {}", player_id, e))
        })?;

        info!(room_id = %room_id, player_id = %player_id, "Player left");
        self.drive(step).await;

        if self.registry.remove_if_empty(&self.room.code, &self.room.id) {
            self.event_bus.remove_room(&self.room.id).await;
        }

        Ok(())
    }

    /// Publishes a step's events, then waits out and applies each pending
    /// transition until the session settles.
    async fn drive(&self, step: Step) {
        let mut step = step;
        loop {
            let Step { events, pending } = step;
            for envelope in events {
                self.publish(envelope).await;
            }

            let Some(pending) = pending else {
                break;
            };
            if !pending.delay.is_zero() {
                tokio::time::sleep(pending.delay).await;
            }

            debug!(room_id = %self.room.id, transition = ?pending.transition, "Applying transition");
            step = self.room.session().advance();
        }
    }

    async fn publish(&self, envelope: Envelope) {
        if let SessionEvent::RoundAborted { reason } = &envelope.event {
            warn!(room_id = %self.room.id, reason = %reason, "Round aborted");
        }
        self.event_bus
            .emit_to_room(&self.room.id, RoomEvent::Outbound(envelope))
            .await;
    }
}
