//! Live WebSocket endpoint
//!
//! GET /ws — upgrades and hands the socket to the session loop.

use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;

use crate::live::session;
use crate::state::AppState;

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| session::run(socket, state, "browser".to_string()))
}
