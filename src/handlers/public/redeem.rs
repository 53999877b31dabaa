use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::Instrument;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::redemption::{self, RedeemQueryResponse};
use crate::upstream::Endpoint;
use crate::util::client_ip;

/// Redeem the key, query its state, and return the reconciled card.
///
/// Upstream failures are folded into the response (`ok: false`); only a
/// malformed body or a missing key produce a 400.
pub async fn redeem_and_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<axum::Json<RedeemQueryResponse>> {
    let span = tracing::info_span!(
        "redeem_query",
        request_id = %Uuid::new_v4(),
        client_ip = %client_ip(&headers).unwrap_or_default()
    );

    let response = redemption::process(&state.upstream, &body)
        .instrument(span)
        .await?;
    Ok(axum::Json(response))
}

/// Forward the body to the upstream redeem endpoint unchanged.
///
/// The upstream status and body are relayed as-is. A body that is not JSON,
/// or a call that gets no response, yields 500 `{"success": false}`.
pub async fn redeem_passthrough(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let body: Value = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected malformed passthrough body");
            return Ok(passthrough_failure());
        }
    };

    let upstream = state.upstream.call(Endpoint::Redeem, &body).await;

    if upstream.is_transport_failure() {
        return Ok(passthrough_failure());
    }

    let status = StatusCode::from_u16(upstream.status).map_err(|e| {
        AppError::Internal(format!("Upstream returned invalid status {}: {}", upstream.status, e))
    })?;

    Ok((status, axum::Json(upstream.data)).into_response())
}

fn passthrough_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(json!({ "success": false })),
    )
        .into_response()
}
