use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{health_handler, redirect_handler, shorten_handler, usage_handler};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        // codes are exactly six characters, so neither static path can shadow one
        Router::new()
            .route("/healthz", get(health_handler))
            .route("/shorten", post(shorten_handler))
            .route("/usage/{code}", get(usage_handler))
            .route("/{code}", get(redirect_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
