//! Gemini chat over the REST `generateContent` endpoint
//!
//! The whole conversation is re-sent on every turn; the model keeps no state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::bridge::{BridgeError, HttpMethod, HttpRequest, HttpTransport, IsahcTransport};

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro";
pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("GEMINI_API_KEY environment variable is not set")]
    MissingApiKey,
    #[error("Gemini API error (HTTP {status}): {message}")]
    Model { status: u16, message: String },
    #[error("Gemini returned no text")]
    EmptyResponse,
    #[error("Gemini request failed: {0}")]
    Transport(String),
    #[error("invalid Gemini response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stateful chat with a language model
#[async_trait::async_trait]
pub trait ChatModel: Send {
    /// Append `text` as a user turn and return the model's reply text
    async fn send(&mut self, text: &str) -> Result<String, AgentError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    #[serde(default)]
    message: String,
}

pub struct GeminiChat {
    transport: Box<dyn HttpTransport>,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Option<Duration>,
    history: Vec<Content>,
}

impl GeminiChat {
    /// Chat using the key from `GEMINI_API_KEY`
    pub fn from_env(model: &str) -> Result<Self, AgentError> {
        let api_key = std::env::var(GEMINI_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AgentError::MissingApiKey)?;
        let transport = IsahcTransport::new().map_err(|e| AgentError::Transport(e.to_string()))?;
        Self::new(Box::new(transport), model, &api_key)
    }

    pub fn new(
        transport: Box<dyn HttpTransport>,
        model: &str,
        api_key: &str,
    ) -> Result<Self, AgentError> {
        if api_key.trim().is_empty() {
            return Err(AgentError::MissingApiKey);
        }
        Ok(Self {
            transport,
            endpoint: GEMINI_ENDPOINT.to_string(),
            model: model.to_string(),
            api_key: api_key.trim().to_string(),
            timeout: Some(DEFAULT_GEMINI_TIMEOUT),
            history: Vec::new(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    /// `None` waits indefinitely
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint,
            crate::core::bridge::url::encode_segment(&self.model),
            urlencoding::encode(&self.api_key)
        )
    }
}

#[async_trait::async_trait]
impl ChatModel for GeminiChat {
    async fn send(&mut self, text: &str) -> Result<String, AgentError> {
        self.history.push(Content::text("user", text));

        let body = serde_json::to_vec(&GenerateContentRequest {
            contents: &self.history,
        })?;
        let request = HttpRequest::new(HttpMethod::Post, self.url())
            .with_body(body)
            .with_timeout(self.timeout);

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                // Failed turns are not part of the conversation
                self.history.pop();
                return Err(AgentError::Transport(e.to_string()));
            }
        };

        if !response.is_success() {
            self.history.pop();
            let message = serde_json::from_slice::<GeminiErrorBody>(&response.body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| response.text().trim().to_string());
            return Err(AgentError::Model {
                status: response.status_code,
                message,
            });
        }

        let parsed: GenerateContentResponse = match serde_json::from_slice(&response.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.history.pop();
                return Err(e.into());
            }
        };

        let reply: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if reply.is_empty() {
            self.history.pop();
            return Err(AgentError::EmptyResponse);
        }

        self.history.push(Content::text("model", &reply));
        Ok(reply)
    }
}
