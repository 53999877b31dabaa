mod redeem;

pub use redeem::*;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::app::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/redeem", post(redeem_passthrough))
        .route("/api/redeem-query", post(redeem_and_query))
}
