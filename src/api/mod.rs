pub mod chats;
pub mod messages;
pub mod users;

use axum::Router;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::database::DbPool;
use crate::server::config::Config;
use crate::websocket::presence::PresenceRegistry;

pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub presence: Arc<PresenceRegistry>,
}

pub fn routes(state: Arc<AppState>) -> Router {
    let ws_route = Router::new()
        .route(
            "/ws",
            axum::routing::get(crate::websocket::handlers::ws_handler),
        )
        .with_state(state.clone());

    Router::new()
        .merge(ws_route)
        .nest("/users", users::routes(state.clone()))
        .nest("/chats", chats::routes(state.clone()))
        .nest("/messages", messages::routes(state.clone()))
        // Persisted voice assets are served straight from disk.
        .nest_service("/files", ServeDir::new(&state.config.files_dir))
}
