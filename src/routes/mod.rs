//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The coordinator exposes exactly two endpoints: the WebSocket upgrade at
//! `/ws` that everything flows through, and a `/healthz` probe. CORS is wide
//! open because classroom clients are served from wherever the school hosts
//! them.

pub mod ws;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws::handle_ws))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}
