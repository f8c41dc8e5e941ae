//! MCP Bridge REST Client
//!
//! One async method per bridge endpoint. Requests go through an injected
//! [`HttpTransport`]; every request is logged with its own correlation id.

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::core::bridge::postman::{GeneratedCollection, PostmanTarget};
use crate::core::bridge::transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, IsahcTransport,
};
use crate::core::bridge::types::*;
use crate::core::bridge::url::{build_url, format_minutes, normalize_base_url, validate_base_url, Route};
use crate::core::debug_logger::EnhancedDebugLogger;

/// Per-category request timeouts; `None` waits indefinitely
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestTimeouts {
    pub default: Option<Duration>,
    pub tool_execution: Option<Duration>,
    pub discovery: Option<Duration>,
}

impl Default for RequestTimeouts {
    fn default() -> Self {
        Self {
            default: Some(Duration::from_secs(30)),
            tool_execution: Some(Duration::from_secs(6000)),
            discovery: Some(Duration::from_secs(180)),
        }
    }
}

pub struct BridgeClient {
    base_url: String,
    transport: Box<dyn HttpTransport>,
    timeouts: RequestTimeouts,
    logger: EnhancedDebugLogger,
}

impl BridgeClient {
    /// Client over the isahc transport
    pub fn new(base_url: &str) -> Result<Self, BridgeError> {
        let transport =
            IsahcTransport::new().map_err(|e| BridgeError::Transport(e.to_string()))?;
        Self::with_transport(base_url, Box::new(transport))
    }

    pub fn with_transport(
        base_url: &str,
        transport: Box<dyn HttpTransport>,
    ) -> Result<Self, BridgeError> {
        let base_url = normalize_base_url(base_url);
        validate_base_url(&base_url)?;
        Ok(Self {
            base_url,
            transport,
            timeouts: RequestTimeouts::default(),
            logger: EnhancedDebugLogger::new(),
        })
    }

    pub fn with_timeouts(mut self, timeouts: RequestTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_logger(mut self, logger: EnhancedDebugLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeouts(&self) -> &RequestTimeouts {
        &self.timeouts
    }

    // Health and servers

    pub async fn health(&self) -> Result<HealthStatus, BridgeError> {
        self.get(&Route::Health).await
    }

    pub async fn list_servers(&self) -> Result<Vec<ServerDescriptor>, BridgeError> {
        let list: ServerList = self.get(&Route::Servers).await?;
        Ok(list.servers)
    }

    pub async fn register_server(
        &self,
        server: &NewServer,
    ) -> Result<RegisteredServer, BridgeError> {
        let response = self
            .send(HttpMethod::Post, &Route::Servers, Some(server), self.timeouts.default)
            .await?;
        decode(&response)
    }

    /// Remove a server; a 404 surfaces as `BridgeError::Status`
    pub async fn remove_server(&self, server_id: &str) -> Result<Value, BridgeError> {
        let response = self
            .send::<()>(HttpMethod::Delete, &Route::Server(server_id), None, self.timeouts.default)
            .await?;
        decode(&response)
    }

    // Tools

    pub async fn list_tools(&self, server_id: &str) -> Result<Vec<ToolDescriptor>, BridgeError> {
        let list: ToolList = self.get(&Route::ServerTools(server_id)).await?;
        Ok(list.tools)
    }

    /// Flat `GET /tools[?server=]` listing
    pub async fn list_routed_tools(
        &self,
        server_id: Option<&str>,
    ) -> Result<Vec<ToolDescriptor>, BridgeError> {
        let list: ToolList = self.get(&Route::Tools { server: server_id }).await?;
        Ok(list.tools)
    }

    pub async fn execute_tool(
        &self,
        server_id: &str,
        tool_name: &str,
        arguments: &Value,
    ) -> Result<ToolExecution, BridgeError> {
        let route = Route::ServerTool {
            server: server_id,
            tool: tool_name,
        };
        let response = self
            .send(HttpMethod::Post, &route, Some(arguments), self.timeouts.tool_execution)
            .await?;
        Ok(ToolExecution::from_value(decode(&response)?))
    }

    /// Flat `POST /tools/{tool}[?server=]` execution
    pub async fn execute_routed_tool(
        &self,
        tool_name: &str,
        arguments: &Value,
        server_id: Option<&str>,
    ) -> Result<ToolExecution, BridgeError> {
        let route = Route::Tool {
            tool: tool_name,
            server: server_id,
        };
        let response = self
            .send(HttpMethod::Post, &route, Some(arguments), self.timeouts.tool_execution)
            .await?;
        Ok(ToolExecution::from_value(decode(&response)?))
    }

    // Resources and prompts

    pub async fn list_resources(
        &self,
        server_id: &str,
    ) -> Result<Vec<ResourceDescriptor>, BridgeError> {
        let list: ResourceList = self.get(&Route::ServerResources(server_id)).await?;
        Ok(list.resources)
    }

    pub async fn read_resource(&self, server_id: &str, uri: &str) -> Result<Value, BridgeError> {
        self.get(&Route::ServerResource {
            server: server_id,
            uri,
        })
        .await
    }

    pub async fn list_prompts(&self, server_id: &str) -> Result<Vec<PromptDescriptor>, BridgeError> {
        let list: PromptList = self.get(&Route::ServerPrompts(server_id)).await?;
        Ok(list.prompts)
    }

    pub async fn execute_prompt(
        &self,
        server_id: &str,
        prompt_name: &str,
        arguments: &Value,
    ) -> Result<Value, BridgeError> {
        let route = Route::ServerPrompt {
            server: server_id,
            prompt: prompt_name,
        };
        let response = self
            .send(HttpMethod::Post, &route, Some(arguments), self.timeouts.default)
            .await?;
        decode(&response)
    }

    // Confirmations

    pub async fn resolve_confirmation(
        &self,
        confirmation_id: &str,
        confirm: bool,
    ) -> Result<Value, BridgeError> {
        let body = ConfirmationDecision { confirm };
        let response = self
            .send(
                HttpMethod::Post,
                &Route::Confirmation(confirmation_id),
                Some(&body),
                self.timeouts.default,
            )
            .await?;
        self.logger.confirmation_decision(confirmation_id, confirm);
        decode(&response)
    }

    // Postman and diagnostics

    pub async fn generate_postman(
        &self,
        target: &PostmanTarget,
    ) -> Result<GeneratedCollection, BridgeError> {
        let response = self
            .send(HttpMethod::Post, &Route::GeneratePostman, Some(target), self.timeouts.discovery)
            .await?;
        decode(&response)
    }

    /// `POST /test/timeout/{minutes}`; no timeout unless one is supplied
    pub async fn timeout_probe(
        &self,
        minutes: f64,
        client_timeout: Option<Duration>,
    ) -> Result<Value, BridgeError> {
        let minutes = format_minutes(minutes);
        let response = self
            .send::<()>(HttpMethod::Post, &Route::TimeoutTest(&minutes), None, client_timeout)
            .await?;
        decode(&response)
    }

    /// Tools of every listed server, in listing order
    ///
    /// A server whose tool listing fails contributes an empty list; a failed
    /// server listing yields an empty catalog.
    pub async fn fetch_tool_catalog(&self) -> ToolCatalog {
        let servers = match self.list_servers().await {
            Ok(servers) => servers,
            Err(e) => {
                self.logger
                    .error_sync("BridgeClient", "catalog_servers_failed", &e.to_string());
                return Vec::new();
            }
        };

        let mut catalog = Vec::with_capacity(servers.len());
        for server in servers {
            let tools = match self.list_tools(&server.id).await {
                Ok(tools) => tools,
                Err(e) => {
                    self.logger.error_sync(
                        "BridgeClient",
                        "catalog_tools_failed",
                        &format!("{}: {}", server.id, e),
                    );
                    Vec::new()
                }
            };
            catalog.push(ServerTools {
                server_id: server.id,
                tools,
            });
        }
        catalog
    }

    async fn get<T: DeserializeOwned>(&self, route: &Route<'_>) -> Result<T, BridgeError> {
        let response = self
            .send::<()>(HttpMethod::Get, route, None, self.timeouts.default)
            .await?;
        decode(&response)
    }

    /// Send one request; non-2xx statuses become `BridgeError::Status`
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        route: &Route<'_>,
        body: Option<&B>,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse, BridgeError> {
        let url = build_url(&self.base_url, route);
        let correlation_id = Uuid::new_v4().to_string();
        let start = Instant::now();

        let mut request = HttpRequest::new(method, url.clone()).with_timeout(timeout);
        if let Some(body) = body {
            request = request.with_body(serde_json::to_vec(body)?);
        }

        self.logger
            .bridge_request_start(&method.to_string(), &url, &correlation_id);

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                self.logger.bridge_request_end(
                    &e.to_string(),
                    None,
                    start.elapsed().as_millis() as u64,
                    &correlation_id,
                );
                return Err(BridgeError::from_transport(&url, e));
            }
        };

        let outcome = if response.is_success() { "success" } else { "http_error" };
        self.logger.bridge_request_end(
            outcome,
            Some(response.status_code),
            start.elapsed().as_millis() as u64,
            &correlation_id,
        );

        if response.is_success() {
            Ok(response)
        } else {
            Err(status_error(&response))
        }
    }
}

/// Decode a success body; an empty body decodes as JSON `null`
fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, BridgeError> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    Ok(serde_json::from_slice(&response.body)?)
}

fn status_error(response: &HttpResponse) -> BridgeError {
    let status = response.status_code;
    let parsed = serde_json::from_slice::<Value>(&response.body).ok();

    let json_message = parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .map(crate::core::bridge::envelope::display_value);
    let details = parsed
        .as_ref()
        .and_then(|v| v.get("details"))
        .map(crate::core::bridge::envelope::display_value);

    let message = json_message.unwrap_or_else(|| {
        let text = response.text().trim().to_string();
        if text.is_empty() {
            reason_phrase(status)
        } else {
            text
        }
    });

    BridgeError::Status {
        status,
        message,
        details,
    }
}

fn reason_phrase(status: u16) -> String {
    isahc::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown status")
        .to_string()
}
