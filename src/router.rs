use axum::{
    extract::{Path, State},
    response::Html,
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::room::{RoomCode, RoomStatus};
use crate::shared::{AppError, AppState};
use crate::websockets::websocket_handler;

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/rooms/:code", get(room_status))
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

async fn index() -> Html<&'static str> {
    Html(
        "<!doctype html><html><body><h1>Gongzhu server</h1>\
         <p>Connect a client to <code>/ws?room=123456&amp;name=you</code>.</p></body></html>",
    )
}

async fn health() -> &'static str {
    "OK"
}

async fn room_status(
    Path(code): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<RoomStatus>, AppError> {
    let code = RoomCode::parse(&code)?;
    let room = app_state
        .registry
        .get(&code)
        .ok_or_else(|| AppError::NotFound(format!("Room {}", code)))?;

    let status = RoomStatus::from_session(code, &room.session());
    Ok(Json(status))
}
