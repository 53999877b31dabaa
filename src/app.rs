use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::handlers;
use crate::upstream::UpstreamClient;

/// Shared state for request handlers. Holds no per-request data.
#[derive(Debug, Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            upstream: UpstreamClient::new(config),
        }
    }
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = handlers::public::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.cors_allow_any {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
