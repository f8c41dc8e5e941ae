//! Tool-call extraction from free-form model replies
//!
//! Models do not reliably return bare JSON. The reply is searched with four
//! strategies, in order, and the first JSON object that parses wins:
//!
//! 1. from the last `{` to the end of the text
//! 2. the first ```` ```json ```` fenced block
//! 3. each non-empty segment between ```` ``` ```` fences
//! 4. from the first `{` to the last `}`
//!
//! Candidates have all whitespace runs collapsed to one space before parsing,
//! so line breaks inside string values do not break decoding.

use serde_json::{Map, Value};

/// Tool invocation requested by the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub server_id: Option<String>,
    pub tool_name: Option<String>,
    pub parameters: Option<Value>,
}

impl ToolCall {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            server_id: text("server_id"),
            tool_name: text("tool_name"),
            parameters: obj.get("parameters").filter(|p| !p.is_null()).cloned(),
        })
    }

    /// Server, tool and parameters are all present
    pub fn actionable(&self) -> bool {
        self.server_id.is_some() && self.tool_name.is_some() && self.parameters.is_some()
    }

    /// `(server, tool, parameters)` when actionable
    pub fn parts(&self) -> Option<(&str, &str, &Value)> {
        Some((
            self.server_id.as_deref()?,
            self.tool_name.as_deref()?,
            self.parameters.as_ref()?,
        ))
    }
}

/// Parsed model reply
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    pub tool_call: Option<ToolCall>,
    /// Text meant for the user
    pub response: String,
}

impl AgentReply {
    pub fn actionable_call(&self) -> Option<&ToolCall> {
        self.tool_call.as_ref().filter(|c| c.actionable())
    }

    fn from_object(obj: Map<String, Value>, fallback_response: impl FnOnce() -> String) -> Self {
        let tool_call = obj.get("tool_call").and_then(ToolCall::from_value);
        let response = match obj.get("response") {
            None | Some(Value::Null) => fallback_response(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        Self {
            tool_call,
            response,
        }
    }
}

/// Collapse whitespace and parse; only non-empty objects are accepted
fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    let cleaned = candidate.split_whitespace().collect::<Vec<_>>().join(" ");
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Object(obj)) if !obj.is_empty() => Some(obj),
        _ => None,
    }
}

pub fn extract_reply(text: &str) -> AgentReply {
    // 1. last `{` to the end
    if let Some(last_brace) = text.rfind('{') {
        let candidate = format!("{{{}", text[last_brace + 1..].trim());
        if let Some(obj) = parse_object(&candidate) {
            return AgentReply::from_object(obj, || text[..last_brace].trim().to_string());
        }
    }

    // 2. first ```json block
    if let Some(fence) = text.find("```json") {
        let after = &text[fence + "```json".len()..];
        let block = after.split("```").next().unwrap_or_default().trim();
        if let Some(obj) = parse_object(block) {
            return AgentReply::from_object(obj, || text[..fence].trim().to_string());
        }
    }

    // 3. any fenced segment
    if let Some(first_fence) = text.find("```") {
        for part in text.split("```") {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Some(obj) = parse_object(part) {
                return AgentReply::from_object(obj, || text[..first_fence].trim().to_string());
            }
        }
    }

    // 4. first `{` through last `}`
    if let (Some(start), Some(close)) = (text.find('{'), text.rfind('}')) {
        let end = close + 1;
        if start < end {
            if let Some(obj) = parse_object(&text[start..end]) {
                return AgentReply::from_object(obj, || {
                    format!("{}{}", &text[..start], &text[end..]).trim().to_string()
                });
            }
        }
    }

    AgentReply {
        tool_call: None,
        response: text.trim().to_string(),
    }
}
