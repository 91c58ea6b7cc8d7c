use axum::{
    extract::{State, ws::WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;

use super::connection::handle_connection;
use crate::api::AppState;

pub async fn ws_handler(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}
