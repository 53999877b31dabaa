//! The redeem-then-query flow behind `POST /api/redeem-query`.

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::messages;
use crate::reconcile::{self, CardRecord};
use crate::upstream::{Endpoint, UpstreamClient, UpstreamResponse};
use crate::util::mask_key;

/// Field names the key may arrive under, in priority order. The outbound
/// payload carries the key under all of them.
pub const KEY_ALIASES: [&str; 5] = ["key_id", "key", "code", "cardKey", "token"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemQueryMeta {
    pub redeem_status: u16,
    pub query_status: u16,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemQueryResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub activated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<CardRecord>,
    pub meta: RedeemQueryMeta,
}

/// Pull the redemption key out of an inbound body.
///
/// The first non-null alias wins; it must be a non-empty string.
pub fn extract_key(body: &Value) -> Result<String> {
    KEY_ALIASES
        .iter()
        .find_map(|alias| body.get(alias).filter(|v| !v.is_null()))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(String::from)
        .ok_or_else(|| AppError::BadRequest(messages::MISSING_KEY.into()))
}

/// The inbound object with the key set under every alias.
pub fn build_payload(body: &Value, key: &str) -> Value {
    let mut payload = body.as_object().cloned().unwrap_or_else(Map::new);
    for alias in KEY_ALIASES {
        payload.insert(alias.to_string(), Value::String(key.to_string()));
    }
    Value::Object(payload)
}

/// Call redeem, then query, one after the other.
///
/// A failed redeem never stops the query: an already-redeemed key still
/// resolves through query alone.
pub async fn redeem_then_query(
    client: &UpstreamClient,
    payload: &Value,
) -> (UpstreamResponse, UpstreamResponse) {
    let redeem = client.call(Endpoint::Redeem, payload).await;
    let query = client.call(Endpoint::Query, payload).await;
    (redeem, query)
}

/// Run the full flow for one inbound body.
pub async fn process(client: &UpstreamClient, body: &Value) -> Result<RedeemQueryResponse> {
    let started_at = Utc::now();

    let key = extract_key(body)?;
    let payload = build_payload(body, &key);

    let (redeem, query) = redeem_then_query(client, &payload).await;
    let result = reconcile::reconcile(&redeem, &query, started_at);

    tracing::info!(
        key = %mask_key(&key),
        ok = result.success,
        source = %result.source.map_or_else(|| "none".to_string(), |s| s.to_string()),
        redeem_status = redeem.status,
        query_status = query.status,
        "Redemption reconciled"
    );

    Ok(RedeemQueryResponse {
        ok: result.success,
        error: result.error,
        activated_at: result.activated_at,
        card: result.card,
        meta: RedeemQueryMeta {
            redeem_status: redeem.status,
            query_status: query.status,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_key_alias_order() {
        assert_eq!(extract_key(&json!({ "code": "c", "key_id": "k" })).unwrap(), "k");
        assert_eq!(extract_key(&json!({ "token": " t " })).unwrap(), "t");
        assert_eq!(extract_key(&json!({ "key_id": null, "cardKey": "ck" })).unwrap(), "ck");
    }

    #[test]
    fn test_extract_key_rejects_missing_or_non_string() {
        assert!(extract_key(&json!({})).is_err());
        assert!(extract_key(&json!(null)).is_err());
        assert!(extract_key(&json!(["abc"])).is_err());
        assert!(extract_key(&json!({ "key_id": 123, "key": "fallback" })).is_err());
        assert!(extract_key(&json!({ "key_id": "   " })).is_err());
    }

    #[test]
    fn test_build_payload_sets_every_alias() {
        let payload = build_payload(&json!({ "key": "abc", "lang": "zh" }), "abc");
        for alias in KEY_ALIASES {
            assert_eq!(payload[alias], "abc");
        }
        assert_eq!(payload["lang"], "zh");
    }
}
