//! Shared utility functions.

use axum::http::HeaderMap;

/// Redemption keys are bearer secrets; only a short prefix goes to logs.
pub fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    format!("{}***", prefix)
}

/// Client IP from proxy headers, for request logging.
///
/// Tries `x-forwarded-for` first (first hop only), then `x-real-ip`.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
