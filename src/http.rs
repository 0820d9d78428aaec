//! HTTP client for Valyu API calls.
//!
//! Thin async wrapper over reqwest with `x-api-key` authentication. API
//! methods receive the raw outcome of each exchange ([`JsonOutcome`]) and map
//! it to typed responses themselves; this layer performs no retries.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const DEFAULT_POOL_SIZE: usize = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP error details.
#[derive(Debug, Clone)]
pub struct HttpErrorDetail {
    pub status: u16,
    pub url: String,
    pub message: String,
    pub body_snippet: Option<String>,
}

impl std::fmt::Display for HttpErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} for {}: {}", self.status, self.url, self.message)?;
        if let Some(ref snippet) = self.body_snippet {
            let truncated: String = snippet.chars().take(200).collect();
            write!(f, " | body[0:200]={}", truncated)?;
        }
        Ok(())
    }
}

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error(
        "request failed: {0} (is_connect={connect}, is_timeout={timeout})",
        connect = .0.is_connect(),
        timeout = .0.is_timeout()
    )]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Response(HttpErrorDetail),

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl HttpError {
    /// Create an HTTP error from a response.
    pub fn from_response(status: u16, url: &str, body: Option<&str>) -> Self {
        let body_snippet = body.map(|s| s.chars().take(4096).collect());
        HttpError::Response(HttpErrorDetail {
            status,
            url: url.to_string(),
            message: "request_failed".to_string(),
            body_snippet,
        })
    }

    /// Get the HTTP status code, if available.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Response(detail) => Some(detail.status),
            HttpError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Decoded result of one HTTP exchange.
///
/// `body` is the parsed JSON payload, or `Value::Null` when the body is
/// empty or not valid JSON.
#[derive(Debug, Clone)]
pub struct JsonOutcome {
    pub status: u16,
    pub ok: bool,
    pub body: Value,
}

impl JsonOutcome {
    /// Remote error message, falling back to a generic status line when the
    /// body carries no parseable `error` field.
    pub fn error_message(&self) -> String {
        self.body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("HTTP Error: {}", self.status))
    }
}

/// Async HTTP client for the Valyu API.
///
/// Every request carries the `x-api-key` header and
/// `Content-Type: application/json`.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL for the API (without trailing slash)
    /// * `api_key` - API key sent as `x-api-key`
    /// * `timeout_secs` - Request timeout in seconds
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, HttpError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|_| HttpError::InvalidHeader("invalid api key characters".to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(DEFAULT_POOL_SIZE)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .tcp_nodelay(true)
            .build()
            .map_err(HttpError::Request)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Convert a relative path to an absolute URL.
    fn abs_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Make a GET request and return the decoded outcome.
    pub async fn get_outcome(
        &self,
        path: &str,
        params: Option<&[(&str, &str)]>,
    ) -> Result<JsonOutcome, HttpError> {
        let url = self.abs_url(path);
        debug!(%url, "GET");
        let mut req = self.client.get(&url);
        if let Some(p) = params {
            req = req.query(p);
        }
        self.execute(req).await
    }

    /// Make a POST request with a JSON body and return the decoded outcome.
    pub async fn post_outcome(&self, path: &str, body: &Value) -> Result<JsonOutcome, HttpError> {
        let url = self.abs_url(path);
        debug!(%url, "POST");
        self.execute(self.client.post(&url).json(body)).await
    }

    /// Make a DELETE request and return the decoded outcome.
    pub async fn delete_outcome(&self, path: &str) -> Result<JsonOutcome, HttpError> {
        let url = self.abs_url(path);
        debug!(%url, "DELETE");
        self.execute(self.client.delete(&url)).await
    }

    /// Make a GET request and return raw bytes, raising on non-2xx.
    pub async fn get_bytes(
        &self,
        path: &str,
        params: Option<&[(&str, &str)]>,
    ) -> Result<Vec<u8>, HttpError> {
        let url = self.abs_url(path);
        debug!(%url, "GET bytes");
        let mut req = self.client.get(&url);
        if let Some(p) = params {
            req = req.query(p);
        }
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        if (200..300).contains(&status) {
            return Ok(body.to_vec());
        }
        let text = String::from_utf8_lossy(&body);
        Err(HttpError::from_response(
            status,
            &url,
            if text.trim().is_empty() { None } else { Some(&text) },
        ))
    }

    /// Make a POST request expecting a server-sent-event response.
    ///
    /// Returns the raw response so the caller can consume the byte stream;
    /// the status is not checked here.
    pub async fn post_event_stream(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<reqwest::Response, HttpError> {
        let url = self.abs_url(path);
        debug!(%url, "POST (event stream)");
        let resp = self
            .client
            .post(&url)
            .header(ACCEPT, "text/event-stream")
            .json(body)
            .send()
            .await?;
        Ok(resp)
    }

    async fn execute(&self, req: reqwest::RequestBuilder) -> Result<JsonOutcome, HttpError> {
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Ok(JsonOutcome {
            status,
            ok: (200..300).contains(&status),
            body,
        })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_abs_url_relative() {
        let client = HttpClient::new("https://api.valyu.ai/v1", "test_key", 30).unwrap();
        assert_eq!(
            client.abs_url("/deepsearch"),
            "https://api.valyu.ai/v1/deepsearch"
        );
        assert_eq!(
            client.abs_url("contents/jobs/abc"),
            "https://api.valyu.ai/v1/contents/jobs/abc"
        );
    }

    #[test]
    fn test_abs_url_absolute_passthrough() {
        let client = HttpClient::new("https://api.valyu.ai/v1", "test_key", 30).unwrap();
        assert_eq!(
            client.abs_url("https://other.com/path"),
            "https://other.com/path"
        );
    }

    #[test]
    fn test_abs_url_trailing_slash() {
        let client = HttpClient::new("https://api.valyu.ai/v1/", "test_key", 30).unwrap();
        assert_eq!(client.abs_url("/answer"), "https://api.valyu.ai/v1/answer");
    }

    #[tokio::test]
    async fn test_connect_failure_display_names_flags() {
        let client = HttpClient::new("http://127.0.0.1:9", "test_key", 5).unwrap();
        let err = client.get_outcome("/deepsearch", None).await.unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("request failed:"), "{message}");
        assert!(message.contains("is_connect="), "{message}");
        assert!(message.contains("is_timeout="), "{message}");
    }

    #[test]
    fn test_error_message_from_body() {
        let outcome = JsonOutcome {
            status: 400,
            ok: false,
            body: json!({"error": "bad query"}),
        };
        assert_eq!(outcome.error_message(), "bad query");
    }

    #[test]
    fn test_error_message_fallback() {
        let outcome = JsonOutcome {
            status: 503,
            ok: false,
            body: Value::Null,
        };
        assert_eq!(outcome.error_message(), "HTTP Error: 503");
    }

    #[test]
    fn test_http_error_display() {
        let err = HttpError::from_response(404, "https://api.valyu.ai/v1/test", Some("not found"));
        let msg = format!("{}", err);
        assert!(msg.contains("404"));
        assert!(msg.contains("not found"));
    }
}
