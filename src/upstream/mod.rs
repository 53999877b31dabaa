mod client;

pub use client::*;

use serde::Serialize;
use serde_json::{Value, json};
use strum::{AsRefStr, Display};

/// The two operations exposed by the card service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Endpoint {
    /// Marks a key as used and may return freshly issued card details
    Redeem,
    /// Reports the current state of a key; safe to repeat
    Query,
}

/// Why an upstream call produced no HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CallFailure {
    Timeout,
    Transport,
}

/// Outcome of one upstream call.
///
/// Always well-formed: transport failures and timeouts are folded in as
/// `ok: false, status: 500, data: {"error": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamResponse {
    pub ok: bool,
    pub status: u16,
    pub data: Value,
    #[serde(skip)]
    pub failure: Option<CallFailure>,
}

impl UpstreamResponse {
    /// Wrap a received HTTP response body.
    ///
    /// Empty bodies decode to `null`; bodies that are not JSON are kept as
    /// `{"raw": <text>}`.
    pub fn from_body(status: u16, text: &str) -> Self {
        let data = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
        };

        Self {
            ok: (200..300).contains(&status),
            status,
            data,
            failure: None,
        }
    }

    pub fn failed(failure: CallFailure, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: 500,
            data: json!({ "error": message.into() }),
            failure: Some(failure),
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        self.failure.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_json_body_is_wrapped_as_raw() {
        let response = UpstreamResponse::from_body(502, "<html>Bad Gateway</html>");
        assert!(!response.ok);
        assert_eq!(response.data, json!({ "raw": "<html>Bad Gateway</html>" }));
    }

    #[test]
    fn test_empty_body_is_null() {
        let response = UpstreamResponse::from_body(204, "");
        assert!(response.ok);
        assert!(response.data.is_null());
    }

    #[test]
    fn test_failed_call_shape() {
        let response = UpstreamResponse::failed(CallFailure::Timeout, "timed out");
        assert_eq!(response.status, 500);
        assert_eq!(response.data["error"], "timed out");
        assert!(response.is_transport_failure());
    }

    #[test]
    fn test_endpoint_names() {
        assert_eq!(Endpoint::Redeem.to_string(), "redeem");
        assert_eq!(Endpoint::Query.as_ref(), "query");
    }
}
