// Payload types exchanged with the MCP Bridge
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::core::bridge::envelope::EnvelopeError;
use crate::core::bridge::transport::TransportError;
use crate::core::bridge::url::UrlError;

/// Risk classification the bridge applies to a server
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    /// Executes directly
    Low,
    /// Requires explicit confirmation
    Medium,
    /// Requires confirmation and runs sandboxed in Docker
    High,
}

impl RiskLevel {
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            1 => Some(RiskLevel::Low),
            2 => Some(RiskLevel::Medium),
            3 => Some(RiskLevel::High),
            _ => None,
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low risk - standard execution",
            RiskLevel::Medium => "Medium risk - requires confirmation",
            RiskLevel::High => "High risk - requires confirmation, runs in Docker",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// Response of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Empty when the bridge omits it
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub uptime: f64,
    #[serde(rename = "serverCount", default)]
    pub server_count: u64,
    /// Some bridge builds embed the server list in the health payload
    #[serde(default)]
    pub servers: Vec<ServerDescriptor>,
}

impl HealthStatus {
    /// A 2xx answer without a status counts as healthy
    pub fn is_ok(&self) -> bool {
        self.status.is_empty() || self.status.eq_ignore_ascii_case("ok")
    }

    pub fn status_text(&self) -> &str {
        if self.status.is_empty() {
            "unknown"
        } else {
            &self.status
        }
    }
}

/// One entry of `GET /servers`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerDescriptor {
    pub id: String,
    #[serde(default)]
    pub pid: Option<u32>,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub initialization_state: Option<String>,
    /// Raw level as reported; unknown values are kept for display
    #[serde(default)]
    pub risk_level: Option<i64>,
    #[serde(default)]
    pub risk_description: Option<String>,
}

impl ServerDescriptor {
    pub fn risk(&self) -> Option<RiskLevel> {
        self.risk_level.and_then(RiskLevel::from_level)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ServerList {
    #[serde(default)]
    pub servers: Vec<ServerDescriptor>,
}

/// Docker sandbox settings for high-risk servers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockerOptions {
    pub image: String,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Body of `POST /servers`
///
/// Also the schema of a server definition file:
///
/// ```toml
/// id = "my-python-server"
/// command = "python"
/// args = ["/path/to/mcp_server.py"]
/// riskLevel = 1
///
/// [env]
/// PYTHONPATH = "/path/to/dependencies"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewServer {
    pub id: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(rename = "riskLevel", default = "default_risk_level")]
    pub risk_level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker: Option<DockerOptions>,
}

fn default_risk_level() -> u8 {
    1
}

impl NewServer {
    pub fn new(id: impl Into<String>, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            id: id.into(),
            command: command.into(),
            args,
            env: BTreeMap::new(),
            risk_level: default_risk_level(),
            docker: None,
        }
    }

    /// Shell-style rendering for progress output
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Response of `POST /servers`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredServer {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub pid: Option<u32>,
    #[serde(default)]
    pub risk_level: Option<i64>,
    #[serde(default)]
    pub risk_description: Option<String>,
}

/// Tool metadata from `GET /servers/{id}/tools`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "inputSchema", default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<InputSchema>,
}

/// JSON-Schema-like parameter block of a tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSchema {
    /// Property name → `{type, description}`, in bridge order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// Flattened view of one schema property
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    pub name: String,
    pub kind: String,
    pub description: String,
}

impl InputSchema {
    pub fn parameters(&self) -> Vec<ParameterInfo> {
        let Some(properties) = &self.properties else {
            return Vec::new();
        };
        properties
            .iter()
            .map(|(name, details)| {
                let kind = match details.get("type") {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => "any".to_string(),
                };
                let description = details
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                ParameterInfo {
                    name: name.clone(),
                    kind,
                    description,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ToolList {
    #[serde(default)]
    pub tools: Vec<ToolDescriptor>,
}

/// Resource metadata from `GET /servers/{id}/resources`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ResourceList {
    #[serde(default)]
    pub resources: Vec<ResourceDescriptor>,
}

/// Prompt metadata from `GET /servers/{id}/prompts`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub arguments: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PromptList {
    #[serde(default)]
    pub prompts: Vec<PromptDescriptor>,
}

/// Pending approval returned instead of a result for risk level >= 2
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    #[serde(default)]
    pub requires_confirmation: bool,
    pub confirmation_id: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub server_id: String,
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub risk_level: Option<i64>,
    #[serde(default)]
    pub risk_description: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Body of `POST /confirmations/{id}`
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct ConfirmationDecision {
    pub confirm: bool,
}

/// Outcome of a tool execution request
#[derive(Debug, Clone, PartialEq)]
pub enum ToolExecution {
    /// Raw response body (usually the double envelope)
    Completed(Value),
    /// The bridge parked the call pending operator approval
    ConfirmationRequired(ConfirmationRequest),
}

impl ToolExecution {
    /// Classify a raw execution response
    ///
    /// Only an explicit `requires_confirmation: true` with a parsable
    /// confirmation record is treated as pending approval.
    pub fn from_value(value: Value) -> Self {
        let pending = value
            .get("requires_confirmation")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if pending {
            if let Ok(request) = serde_json::from_value::<ConfirmationRequest>(value.clone()) {
                return ToolExecution::ConfirmationRequired(request);
            }
        }
        ToolExecution::Completed(value)
    }
}

/// Tools of one server, as collected for the agent
#[derive(Debug, Clone)]
pub struct ServerTools {
    pub server_id: String,
    pub tools: Vec<ToolDescriptor>,
}

/// Tools of every connected server, in listing order
pub type ToolCatalog = Vec<ServerTools>;

/// Errors surfaced by [`crate::core::bridge::BridgeClient`]
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("could not connect to MCP Bridge at {url}: {reason}")]
    Unreachable { url: String, reason: String },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        details: Option<String>,
    },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid bridge URL: {0}")]
    Url(#[from] UrlError),
    #[error("transport error: {0}")]
    Transport(String),
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// HTTP status for `Status` errors
    pub fn status(&self) -> Option<u16> {
        match self {
            BridgeError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, BridgeError::Unreachable { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BridgeError::Timeout { .. })
    }

    pub(crate) fn from_transport(url: &str, error: TransportError) -> Self {
        match error {
            TransportError::Connect(reason) => BridgeError::Unreachable {
                url: url.to_string(),
                reason,
            },
            TransportError::Timeout => BridgeError::Timeout {
                url: url.to_string(),
            },
            TransportError::Other(reason) => BridgeError::Transport(reason),
        }
    }
}
