use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::event::EventBus;
use crate::game::SessionError;
use crate::room::{RoomCodeError, RoomRegistry};
use crate::websockets::{ConnectionManager, InMemoryConnectionManager};

/// Close code for a malformed room code.
pub const CLOSE_INVALID_ROOM: u16 = 4001;
/// Close code for a room with every seat taken.
pub const CLOSE_ROOM_FULL: u16 = 4002;
/// Close code for a room whose game is running or finished.
pub const CLOSE_GAME_UNAVAILABLE: u16 = 4003;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub event_bus: EventBus,
}

impl AppState {
    pub fn new(
        registry: Arc<RoomRegistry>,
        connection_manager: Arc<dyn ConnectionManager>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            registry,
            connection_manager,
            event_bus,
        }
    }

    pub fn in_memory(registry: RoomRegistry) -> Self {
        Self::new(
            Arc::new(registry),
            Arc::new(InMemoryConnectionManager::new()),
            EventBus::new(),
        )
    }
}

/// Locks `mutex`, recovering the data if a holder panicked.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AppError {
    #[error("Invalid room code: {0}")]
    InvalidRoomCode(String),

    #[error("Room is full")]
    RoomFull,

    #[error("Game unavailable: {0}")]
    GameUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Websocket close code used when this error refuses a connection.
    pub fn close_code(&self) -> u16 {
        match self {
            AppError::InvalidRoomCode(_) => CLOSE_INVALID_ROOM,
            AppError::RoomFull => CLOSE_ROOM_FULL,
            AppError::GameUnavailable(_) | AppError::NotFound(_) | AppError::Internal => {
                CLOSE_GAME_UNAVAILABLE
            }
        }
    }
}

impl From<RoomCodeError> for AppError {
    fn from(err: RoomCodeError) -> Self {
        match err {
            RoomCodeError::Invalid(raw) => AppError::InvalidRoomCode(raw),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::RoomFull => AppError::RoomFull,
            SessionError::GameInProgress | SessionError::GameFinished => {
                AppError::GameUnavailable(err.to_string())
            }
            _ => AppError::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::InvalidRoomCode(_) => StatusCode::BAD_REQUEST,
            AppError::RoomFull | AppError::GameUnavailable(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
