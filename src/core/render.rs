// Console rendering for bridge results and agent output
use ansi_term::{Colour, Style};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::core::bridge::envelope::{display_value, first_text, EnvelopeError};
use crate::core::bridge::{
    ConfirmationRequest, HealthStatus, PromptDescriptor, RegisteredServer, ResourceDescriptor,
    RiskLevel, ServerDescriptor, ToolDescriptor,
};

pub const JSON_HIDDEN: &str = "<JSON result hidden>";
pub const DEFAULT_JSON_WIDTH: usize = 100;

/// Formats bridge payloads for terminal output
#[derive(Debug, Clone)]
pub struct ConsoleRenderer {
    pub show_json: bool,
    pub json_width: usize,
    pub color: bool,
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self {
            show_json: true,
            json_width: DEFAULT_JSON_WIDTH,
            color: true,
        }
    }
}

impl ConsoleRenderer {
    pub fn new(show_json: bool, json_width: usize) -> Self {
        Self {
            show_json,
            json_width,
            color: true,
        }
    }

    pub fn plain() -> Self {
        Self {
            color: false,
            ..Self::default()
        }
    }

    /// Pretty JSON honouring `show_json` and `json_width`
    ///
    /// Objects are indented by two spaces, or by one when any line would
    /// exceed the width. Non-objects are rendered as plain text.
    pub fn format_json(&self, value: &Value) -> String {
        if !self.show_json {
            return JSON_HIDDEN.to_string();
        }
        if !value.is_object() {
            return display_value(value);
        }

        let formatted = indented(value, b"  ");
        if formatted.lines().any(|line| line.chars().count() > self.json_width) {
            indented(value, b" ")
        } else {
            formatted
        }
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.color {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(Style::new().bold(), text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(Style::new().dimmed(), text)
    }

    pub fn success(&self, text: &str) -> String {
        format!("{} {}", self.paint(Colour::Green.bold(), "✓"), text)
    }

    pub fn error(&self, text: &str) -> String {
        format!("{} {}", self.paint(Colour::Red.bold(), "✗"), text)
    }

    pub fn warn(&self, text: &str) -> String {
        format!("{} {}", self.paint(Colour::Yellow.bold(), "⚠"), text)
    }

    pub fn heading(&self, text: &str) -> String {
        self.bold(text)
    }

    pub fn separator(&self, width: usize) -> String {
        "=".repeat(width)
    }

    pub fn health_summary(&self, health: &HealthStatus) -> Vec<String> {
        let status = if health.is_ok() {
            self.paint(Colour::Green.bold(), health.status_text())
        } else {
            self.paint(Colour::Red.bold(), health.status_text())
        };
        let mut lines = vec![
            format!("Status: {}", status),
            format!("Server Count: {}", health.server_count),
            format!("Uptime: {:.2} seconds", health.uptime),
        ];
        for server in &health.servers {
            lines.push(format!(
                "  📡 {}: {}",
                server.id,
                server.initialization_state.as_deref().unwrap_or("unknown")
            ));
        }
        lines
    }

    /// `🟢 id (PID: n)` plus a risk line when the bridge reports one
    pub fn server_lines(&self, server: &ServerDescriptor) -> Vec<String> {
        let dot = if server.connected { "🟢" } else { "🔴" };
        let pid = server
            .pid
            .map(|p| p.to_string())
            .unwrap_or_else(|| "n/a".to_string());
        let mut lines = vec![format!("{} {} (PID: {})", dot, server.id, pid)];
        if let Some(level) = server.risk_level {
            lines.push(format!(
                "   Risk Level: {} - {}",
                level,
                risk_text(level, server.risk_description.as_deref())
            ));
        }
        lines
    }

    pub fn registered_server(&self, server: &RegisteredServer) -> Vec<String> {
        let mut lines = vec![self.success(&format!("Server '{}' connected", server.id))];
        if let Some(status) = &server.status {
            lines.push(format!("   Status: {}", status));
        }
        if let Some(pid) = server.pid {
            lines.push(format!("   PID: {}", pid));
        }
        if let Some(level) = server.risk_level {
            lines.push(format!(
                "   Risk Level: {} - {}",
                level,
                risk_text(level, server.risk_description.as_deref())
            ));
        }
        lines
    }

    pub fn tool_line(&self, tool: &ToolDescriptor) -> String {
        format!(
            "🔧 {}: {}",
            self.bold(&tool.name),
            tool.description.as_deref().unwrap_or("No description")
        )
    }

    /// Tool line followed by its parameters
    pub fn tool_details(&self, tool: &ToolDescriptor) -> Vec<String> {
        let mut lines = vec![self.tool_line(tool)];
        if let Some(schema) = &tool.input_schema {
            for param in schema.parameters() {
                let required = schema
                    .required
                    .as_ref()
                    .is_some_and(|r| r.contains(&param.name));
                lines.push(format!(
                    "     - {} ({}){}: {}",
                    param.name,
                    param.kind,
                    if required { ", required" } else { "" },
                    param.description
                ));
            }
        }
        lines
    }

    pub fn resource_lines(&self, resource: &ResourceDescriptor) -> Vec<String> {
        let mut lines = vec![
            format!("📄 {}", resource.name.as_deref().unwrap_or("Unknown")),
            format!("   URI: {}", resource.uri.as_deref().unwrap_or("No URI")),
        ];
        if let Some(mime) = &resource.mime_type {
            lines.push(format!("   Type: {}", mime));
        }
        lines
    }

    pub fn prompt_lines(&self, prompt: &PromptDescriptor) -> Vec<String> {
        vec![
            format!("💬 {}", prompt.name),
            format!(
                "   {}",
                prompt.description.as_deref().unwrap_or("No description")
            ),
        ]
    }

    /// Boxed summary of a pending confirmation
    pub fn confirmation_panel(&self, request: &ConfirmationRequest) -> String {
        let risk = request
            .risk_level
            .map(|l| l.to_string())
            .unwrap_or_else(|| "?".to_string());
        let body = [
            self.paint(Colour::Yellow.bold(), "⚠️ Security Confirmation Required"),
            String::new(),
            format!(
                "Operation: {} on server {}",
                self.bold(&request.method),
                self.bold(&request.server_id)
            ),
            format!("Tool: {}", self.bold(&request.tool_name)),
            format!(
                "Risk Level: {} ({})",
                self.bold(&risk),
                request.risk_description.as_deref().unwrap_or("unknown")
            ),
            format!("Expires: {}", request.expires_at.as_deref().unwrap_or("n/a")),
            String::new(),
            "This operation requires explicit confirmation for security reasons.".to_string(),
        ];

        let border = self.paint(Colour::Yellow.normal(), &"─".repeat(60));
        let mut panel = vec![border.clone()];
        panel.extend(body.iter().map(|line| format!("  {}", line)));
        panel.push(border);
        panel.join("\n")
    }

    /// Result of a tool call, unwrapping the envelope when possible
    pub fn tool_result(&self, raw: &Value) -> String {
        match crate::core::bridge::unwrap_tool_result(raw) {
            Ok(payload) if payload.is_error() => self.error(&payload.display()),
            Ok(payload) => payload.display(),
            // Plain-text tool output
            Err(EnvelopeError::InvalidJson(_)) => first_text(raw)
                .map(str::to_string)
                .unwrap_or_else(|| self.format_json(raw)),
            Err(_) => self.format_json(raw),
        }
    }
}

fn indented(value: &Value, indent: &[u8]) -> String {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent));
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => value.to_string(),
    }
}

fn risk_text(level: i64, description: Option<&str>) -> String {
    match (description, RiskLevel::from_level(level)) {
        (Some(desc), _) => desc.to_string(),
        (None, Some(known)) => known.description().to_string(),
        (None, None) => "unknown risk level".to_string(),
    }
}
