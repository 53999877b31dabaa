//! Shared helpers: an in-process fake of the card service and an app wired to it.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    body::{Body, Bytes},
    extract::State,
    http::{Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

pub use keyrelay::app::{AppState, build_router};
pub use keyrelay::config::Config;

/// Base URL nothing listens on; calls fail fast with a transport error.
pub const UNREACHABLE_UPSTREAM: &str = "http://127.0.0.1:9/api/keys";

/// Canned reply for one fake upstream endpoint.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: value.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn text(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A request the fake upstream received: endpoint name and decoded body.
pub type Recorded = (String, Value);

struct FakeState {
    redeem: Reply,
    query: Reply,
    calls: Arc<Mutex<Vec<Recorded>>>,
}

pub struct FakeUpstream {
    pub base_url: String,
    calls: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeUpstream {
    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }
}

async fn respond(state: &FakeState, endpoint: &str, reply: &Reply, body: Bytes) -> Response {
    let decoded = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state
        .calls
        .lock()
        .unwrap()
        .push((endpoint.to_string(), decoded));

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    (
        reply.status,
        [(header::CONTENT_TYPE, "application/json")],
        reply.body.clone(),
    )
        .into_response()
}

async fn fake_redeem(State(state): State<Arc<FakeState>>, body: Bytes) -> Response {
    respond(&state, "redeem", &state.redeem, body).await
}

async fn fake_query(State(state): State<Arc<FakeState>>, body: Bytes) -> Response {
    respond(&state, "query", &state.query, body).await
}

/// Start a fake card service on an ephemeral port.
pub async fn spawn_upstream(redeem: Reply, query: Reply) -> FakeUpstream {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let state = Arc::new(FakeState {
        redeem,
        query,
        calls: calls.clone(),
    });

    let app = Router::new()
        .route("/api/keys/redeem", post(fake_redeem))
        .route("/api/keys/query", post(fake_query))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeUpstream {
        base_url: format!("http://{}/api/keys", addr),
        calls,
    }
}

/// The relay router pointed at `upstream_base_url`.
pub fn relay_app(upstream_base_url: &str, timeout_ms: u64) -> Router {
    let config = Config::with_upstream(upstream_base_url, timeout_ms);
    build_router(AppState::new(&config), &config)
}

/// POST a raw body and return the status plus the decoded JSON response.
pub async fn post_raw(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, uri, &body.to_string()).await
}
