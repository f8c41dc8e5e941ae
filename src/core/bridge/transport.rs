//! HTTP Transport
//!
//! Abstraction over the HTTP client so the bridge client and the Gemini chat
//! can be driven by a scripted transport in tests.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use isahc::config::{Configurable, RedirectPolicy};
use isahc::error::ErrorKind;
use isahc::{AsyncReadResponseExt, HttpClient, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// Outgoing request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    /// JSON body, if any
    pub body: Option<Vec<u8>>,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            timeout: None,
        }
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Decode the body as JSON (test helper and logging aid)
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_ref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

/// Response with the full body
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: Vec<u8>,
    pub duration: Duration,
    /// Header names are lower-cased
    pub headers: HashMap<String, String>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Other(String),
}

/// HTTP client abstraction for dependency injection and testing
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and read the complete response body
    ///
    /// Non-2xx statuses are returned as responses, not errors; only
    /// connection, timeout and protocol failures map to `TransportError`.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by isahc
pub struct IsahcTransport {
    client: HttpClient,
    user_agent: String,
}

impl IsahcTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = HttpClient::builder()
            .redirect_policy(RedirectPolicy::Limit(5))
            .build()
            .map_err(|e| TransportError::Other(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            user_agent: format!("mcpbridge/{}", env!("CARGO_PKG_VERSION")),
        })
    }
}

fn classify_error(error: &isahc::Error) -> TransportError {
    match error.kind() {
        ErrorKind::Timeout => TransportError::Timeout,
        ErrorKind::ConnectionFailed | ErrorKind::NameResolution => {
            TransportError::Connect(error.to_string())
        }
        _ => TransportError::Other(error.to_string()),
    }
}

#[async_trait::async_trait]
impl HttpTransport for IsahcTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let start = Instant::now();

        let builder = match request.method {
            HttpMethod::Get => Request::get(&request.url),
            HttpMethod::Post => Request::post(&request.url),
            HttpMethod::Delete => Request::delete(&request.url),
        }
        .header("User-Agent", self.user_agent.as_str())
        .header("Accept", "application/json")
        .header("Content-Type", "application/json");

        let builder = match request.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };

        let http_request = builder
            .body(request.body.unwrap_or_default())
            .map_err(|e| TransportError::Other(format!("Request creation failed: {}", e)))?;

        let mut response = self
            .client
            .send_async(http_request)
            .await
            .map_err(|e| classify_error(&e))?;

        let status_code = response.status().as_u16();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                headers.insert(key.as_str().to_lowercase(), value_str.to_string());
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Other(format!("Failed to read response body: {}", e)))?
            .to_vec();

        Ok(HttpResponse {
            status_code,
            body,
            duration: start.elapsed(),
            headers,
        })
    }
}
