//! Tool Result Envelope Unwrapping
//!
//! The bridge answers a tool call with an MCP content array whose first
//! element carries the actual payload as a JSON *string*:
//!
//! ```json
//! {"content": [{"type": "text", "text": "{\"result\": 42}"}]}
//! ```
//!
//! Callers therefore decode twice: once for the HTTP body, once for
//! `content[0].text`.

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("tool response has no content")]
    MissingContent,
    #[error("tool response content has no text")]
    MissingText,
    #[error("tool response text is not JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Decoded inner payload of a tool result
#[derive(Debug, Clone, PartialEq)]
pub enum ToolPayload {
    /// `{"result": ...}`
    Result(Value),
    /// `{"error": ...}`
    Error(Value),
    /// Any other JSON value, e.g. `{"roots": [2, 3]}`
    Other(Value),
}

impl ToolPayload {
    pub fn is_error(&self) -> bool {
        matches!(self, ToolPayload::Error(_))
    }

    pub fn value(&self) -> &Value {
        match self {
            ToolPayload::Result(v) | ToolPayload::Error(v) | ToolPayload::Other(v) => v,
        }
    }

    /// Human-readable rendering; strings are shown without quotes
    pub fn display(&self) -> String {
        display_value(self.value())
    }
}

/// Render a JSON value for console output
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Return `content[0].text` without decoding it
pub fn first_text(raw: &Value) -> Option<&str> {
    raw.get("content")?
        .as_array()?
        .first()?
        .get("text")?
        .as_str()
}

/// Decode the double-encoded tool result
pub fn unwrap_tool_result(raw: &Value) -> Result<ToolPayload, EnvelopeError> {
    let first = raw
        .get("content")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .ok_or(EnvelopeError::MissingContent)?;

    let text = first
        .get("text")
        .and_then(Value::as_str)
        .ok_or(EnvelopeError::MissingText)?;

    let inner: Value = serde_json::from_str(text)?;

    let payload = match inner.as_object() {
        Some(obj) if obj.contains_key("result") => ToolPayload::Result(obj["result"].clone()),
        Some(obj) if obj.contains_key("error") => ToolPayload::Error(obj["error"].clone()),
        _ => ToolPayload::Other(inner),
    };
    Ok(payload)
}
