use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, taxonomy, torrents, ws};
use crate::metrics::metrics_handler;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Taxonomy
        .route("/taxonomy", get(taxonomy::get_taxonomy))
        .route("/taxonomy/{facet}", get(taxonomy::get_facet))
        // Torrents
        .route("/torrents", get(torrents::list_torrents))
        .route("/torrents/refresh", post(torrents::refresh))
        // Live updates
        .route("/ws", get(ws::ws_handler))
        .route_layer(middleware::from_fn(metrics_middleware));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(metrics_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
