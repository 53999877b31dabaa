use std::env;

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://mercury.wxie.de/api/keys";
pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Base URL of the card service; `/redeem` and `/query` are appended
    pub upstream_base_url: String,
    /// Per-call timeout for each upstream request
    pub upstream_timeout_ms: u64,
    /// Allow any origin (the UI is hosted separately)
    pub cors_allow_any: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let upstream_base_url = env::var("UPSTREAM_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_UPSTREAM_BASE_URL.to_string());

        let upstream_timeout_ms: u64 = env::var("UPSTREAM_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_MS);

        let cors_allow_any = env::var("CORS_ALLOW_ANY")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Self {
            host,
            port,
            upstream_base_url: normalize_base_url(&upstream_base_url),
            upstream_timeout_ms,
            cors_allow_any,
        }
    }

    /// Config pointing at an arbitrary upstream, used by tests.
    pub fn with_upstream(upstream_base_url: &str, upstream_timeout_ms: u64) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            upstream_base_url: normalize_base_url(upstream_base_url),
            upstream_timeout_ms,
            cors_allow_any: true,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn redeem_url(&self) -> String {
        format!("{}/redeem", self.upstream_base_url)
    }

    pub fn query_url(&self) -> String {
        format!("{}/query", self.upstream_base_url)
    }
}

pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls_strip_trailing_slash() {
        let config = Config::with_upstream("http://upstream.test/api/keys/", 500);
        assert_eq!(config.redeem_url(), "http://upstream.test/api/keys/redeem");
        assert_eq!(config.query_url(), "http://upstream.test/api/keys/query");
    }
}
