use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::{self, AppState};
use crate::database::{self, DbPool};
use crate::server::config::Config;
use crate::websocket::presence::PresenceRegistry;

/// Connects storage and assembles the full application router.
pub async fn register_routes(config: Config) -> anyhow::Result<Router> {
    let db = database::create_pool(&config.database_url).await?;
    tracing::info!("Database connected and migrations applied");

    Ok(build_routes(db, Arc::new(config)))
}

/// Router over an existing pool. The presence table starts empty; connected
/// clients re-announce their identity after a restart.
pub fn build_routes(db: DbPool, config: Arc<Config>) -> Router {
    let presence = Arc::new(PresenceRegistry::new());

    let state = Arc::new(AppState {
        db,
        config,
        presence,
    });

    api::routes(state)
        // The mobile client is a cross-origin caller.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
