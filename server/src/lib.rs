use std::path::PathBuf;

use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod handlers;
pub mod relay;
pub mod state;

use crate::handlers::{ping_handler, ws_handler};
use crate::state::AppState;

pub const WS_PATH: &str = "/ws";

/// `/ws` upgrades to a relay channel, `/ping` answers liveness probes, and
/// everything else is served from `public_dir` (the page and its wasm bundle).
pub fn router(state: AppState, public_dir: PathBuf) -> Router {
    Router::new()
        .route(WS_PATH, get(ws_handler))
        .route("/ping", get(ping_handler))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
