// Marketplace HTTP client.
// Handles authentication, request timeouts, rate limiting, and response status mapping.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::Serialize;

use crate::config::Config;
use crate::error::{Result, StashError};

use super::types::RateLimit;

const API_KEY_HEADER: &str = "X-ApiKey";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Marketplace API client with authentication and rate limit tracking.
pub struct MarketClient {
    client: Client,
    base_url: String,
    rate_limit: Mutex<RateLimit>,
}

impl MarketClient {
    /// Create a new client for the given API key.
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(StashError::MissingApiKey);
        }

        let mut headers = HeaderMap::new();

        let mut key =
            HeaderValue::from_str(api_key).map_err(|e| StashError::InvalidConfig(e.to_string()))?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("skinstash"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(StashError::Api)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Create a client from a validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_key, &config.base_url, config.timeout)
    }

    /// Get the most recently observed rate limit information.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit
            .lock()
            .map(|limit| limit.clone())
            .unwrap_or_default()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
    ) -> Result<Response> {
        self.send(self.client.get(self.url(endpoint)).query(params))
            .await
    }

    /// Make a POST request with a JSON body.
    pub async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Response> {
        self.send(self.client.post(self.url(endpoint)).json(body))
            .await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(StashError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let header = |name: &str| -> Option<u64> {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };

        let Ok(mut rate_limit) = self.rate_limit.lock() else {
            return;
        };

        if let Some(limit) = header("x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }

    fn rate_limited(&self) -> StashError {
        let reset = self.rate_limit().reset;
        StashError::RateLimited {
            reset_at: format_reset(reset),
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(StashError::Unauthorized),
            StatusCode::NOT_FOUND => {
                let url = response.url().to_string();
                Err(StashError::NotFound(url))
            }
            StatusCode::TOO_MANY_REQUESTS => Err(self.rate_limited()),
            StatusCode::FORBIDDEN => {
                if self.rate_limit().remaining == 0 && self.rate_limit().reset != 0 {
                    Err(self.rate_limited())
                } else {
                    Err(StashError::Remote(format!(
                        "Forbidden: {}",
                        response.text().await.unwrap_or_default()
                    )))
                }
            }
            status => Err(StashError::Remote(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            ))),
        }
    }
}

/// Format a rate limit reset epoch as a wall-clock time.
fn format_reset(reset: u64) -> String {
    if reset == 0 {
        return "unknown".to_string();
    }
    chrono::DateTime::from_timestamp(reset as i64, 0)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_empty_api_key_rejected() {
        let result = MarketClient::new("  ", "https://example.invalid", Duration::from_secs(5));
        assert!(matches!(result, Err(StashError::MissingApiKey)));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client =
            MarketClient::new("key", "https://example.invalid/v1/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("/inventory"), "https://example.invalid/v1/inventory");
    }

    #[test]
    fn test_format_reset() {
        assert_eq!(format_reset(0), "unknown");
        assert_eq!(format_reset(3_661), "01:01:01");
    }

    /// Serve one canned HTTP response on a local port and return its base URL.
    async fn serve_once(status: &str, headers: &[(&str, &str)], body: &str) -> String {
        let mut response = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
            status,
            body.len()
        );
        for (name, value) in headers {
            response.push_str(&format!("{}: {}\r\n", name, value));
        }
        response.push_str("\r\n");
        response.push_str(body);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{}", addr)
    }

    async fn get(status: &str, headers: &[(&str, &str)], body: &str) -> Result<Response> {
        let base_url = serve_once(status, headers, body).await;
        let client = MarketClient::new("key", &base_url, Duration::from_secs(5)).unwrap();
        client.get_with_params("/inventory", &[("app_id", "730")]).await
    }

    #[tokio::test]
    async fn test_success_passes_response_through() {
        let response = get("200 OK", &[], r#"{"items": []}"#).await.unwrap();
        assert_eq!(response.text().await.unwrap(), r#"{"items": []}"#);
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let result = get("401 Unauthorized", &[], "").await;
        assert!(matches!(result, Err(StashError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_not_found_reports_url() {
        let result = get("404 Not Found", &[], "").await;
        assert!(matches!(result, Err(StashError::NotFound(url)) if url.contains("/inventory")));
    }

    #[tokio::test]
    async fn test_too_many_requests_without_headers() {
        let result = get("429 Too Many Requests", &[], "").await;
        assert!(matches!(
            result,
            Err(StashError::RateLimited { reset_at }) if reset_at == "unknown"
        ));
    }

    #[tokio::test]
    async fn test_forbidden_with_exhausted_limit_is_rate_limited() {
        let headers = [
            ("x-ratelimit-limit", "60"),
            ("x-ratelimit-remaining", "0"),
            ("x-ratelimit-reset", "3661"),
        ];
        let result = get("403 Forbidden", &headers, "").await;
        assert!(matches!(
            result,
            Err(StashError::RateLimited { reset_at }) if reset_at == "01:01:01"
        ));
    }

    #[tokio::test]
    async fn test_forbidden_with_quota_left_is_remote() {
        let headers = [("x-ratelimit-remaining", "12"), ("x-ratelimit-reset", "3661")];
        let result = get("403 Forbidden", &headers, "account locked").await;
        assert!(matches!(
            result,
            Err(StashError::Remote(message)) if message == "Forbidden: account locked"
        ));
    }

    #[tokio::test]
    async fn test_other_status_is_remote() {
        let result = get("500 Internal Server Error", &[], "oops").await;
        assert!(matches!(
            result,
            Err(StashError::Remote(message)) if message.starts_with("HTTP 500") && message.ends_with("oops")
        ));
    }

    #[tokio::test]
    async fn test_rate_limit_headers_are_tracked() {
        let headers = [
            ("x-ratelimit-limit", "60"),
            ("x-ratelimit-remaining", "59"),
            ("x-ratelimit-reset", "3661"),
        ];
        let base_url = serve_once("200 OK", &headers, "{}").await;
        let client = MarketClient::new("key", &base_url, Duration::from_secs(5)).unwrap();
        client.get_with_params("/inventory", &[("app_id", "730")]).await.unwrap();

        let limit = client.rate_limit();
        assert_eq!((limit.limit, limit.remaining, limit.reset), (60, 59, 3661));
    }
}
