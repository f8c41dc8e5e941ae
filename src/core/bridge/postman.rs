//! Postman Collection Generation
//!
//! Request shapes for `POST /generate-postman`, a read-only summary of the
//! returned collection, and saving the collection to disk. The collection
//! itself stays raw JSON so the saved file matches what the bridge produced.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Remote (HTTP/SSE) MCP server to discover
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTarget {
    pub server_url: String,
    pub server_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

/// Locally spawned stdio MCP server to discover
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StdioTarget {
    pub server_command: String,
    #[serde(default)]
    pub server_args: Vec<String>,
    #[serde(default)]
    pub server_env: BTreeMap<String, String>,
}

/// Body of `POST /generate-postman`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostmanTarget {
    Remote(RemoteTarget),
    Stdio(StdioTarget),
}

impl PostmanTarget {
    pub fn remote(server_url: impl Into<String>, auth_token: Option<String>) -> Self {
        PostmanTarget::Remote(RemoteTarget {
            server_url: server_url.into(),
            server_type: "http".to_string(),
            auth_token,
        })
    }

    pub fn stdio(
        command: impl Into<String>,
        args: Vec<String>,
        env: BTreeMap<String, String>,
    ) -> Self {
        PostmanTarget::Stdio(StdioTarget {
            server_command: command.into(),
            server_args: args,
            server_env: env,
        })
    }

    /// Short label for progress output
    pub fn label(&self) -> String {
        match self {
            PostmanTarget::Remote(remote) => remote.server_url.clone(),
            PostmanTarget::Stdio(stdio) if stdio.server_args.is_empty() => {
                stdio.server_command.clone()
            }
            PostmanTarget::Stdio(stdio) => {
                format!("{} {}", stdio.server_command, stdio.server_args.join(" "))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMetadata {
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub tools_count: u64,
    #[serde(default)]
    pub resources_count: u64,
    #[serde(default)]
    pub prompts_count: u64,
    #[serde(default)]
    pub generated_at: Option<String>,
}

/// Response of `POST /generate-postman`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCollection {
    pub collection: Value,
    #[serde(default)]
    pub metadata: CollectionMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FolderSummary {
    pub name: String,
    /// `None` for a top-level single request
    pub requests: Option<usize>,
    /// First request names, at most five
    pub sample_requests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableSummary {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleToolRequest {
    pub name: String,
    pub method: String,
    pub url: String,
    /// JSON-RPC fields decoded from `body.raw`, when it parses
    pub rpc_method: Option<String>,
    pub tool_name: Option<String>,
    pub argument_names: Vec<String>,
    pub description: Option<String>,
}

/// What a generated collection contains
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSummary {
    pub name: String,
    pub schema: Option<String>,
    pub folders: Vec<FolderSummary>,
    pub variables: Vec<VariableSummary>,
    pub sample_tool: Option<SampleToolRequest>,
    /// Compact JSON length in characters
    pub size_chars: usize,
}

const SAMPLE_LIMIT: usize = 5;

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

impl CollectionSummary {
    pub fn from_value(collection: &Value) -> Self {
        let info = collection.get("info").cloned().unwrap_or(Value::Null);
        let items = collection
            .get("item")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let folders = items
            .iter()
            .map(|item| {
                let children = item.get("item").and_then(Value::as_array);
                FolderSummary {
                    name: str_field(item, "name").unwrap_or_default(),
                    requests: children.map(Vec::len),
                    sample_requests: children
                        .map(|c| {
                            c.iter()
                                .take(SAMPLE_LIMIT)
                                .filter_map(|r| str_field(r, "name"))
                                .collect()
                        })
                        .unwrap_or_default(),
                }
            })
            .collect();

        let variables = collection
            .get("variable")
            .and_then(Value::as_array)
            .map(|vars| {
                vars.iter()
                    .map(|var| VariableSummary {
                        key: str_field(var, "key").unwrap_or_default(),
                        value: var.get("value").map(crate::core::bridge::envelope::display_value),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let sample_tool = items
            .iter()
            .find(|item| item.get("name").and_then(Value::as_str) == Some("Tools"))
            .and_then(|folder| folder.get("item")?.as_array()?.first())
            .map(sample_tool_request);

        Self {
            name: str_field(&info, "name").unwrap_or_else(|| "(unnamed)".to_string()),
            schema: str_field(&info, "schema"),
            folders,
            variables,
            sample_tool,
            size_chars: collection.to_string().chars().count(),
        }
    }
}

fn sample_tool_request(item: &Value) -> SampleToolRequest {
    let request = item.get("request").cloned().unwrap_or(Value::Null);
    let url = match request.get("url") {
        Some(Value::String(raw)) => raw.clone(),
        Some(url) => str_field(url, "raw").unwrap_or_default(),
        None => String::new(),
    };

    let body = request
        .get("body")
        .and_then(|b| b.get("raw"))
        .and_then(Value::as_str)
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok());
    let params = body.as_ref().and_then(|b| b.get("params"));

    SampleToolRequest {
        name: str_field(item, "name").unwrap_or_default(),
        method: str_field(&request, "method").unwrap_or_else(|| "GET".to_string()),
        url,
        rpc_method: body.as_ref().and_then(|b| str_field(b, "method")),
        tool_name: params.and_then(|p| str_field(p, "name")),
        argument_names: params
            .and_then(|p| p.get("arguments"))
            .and_then(Value::as_object)
            .map(|args| args.keys().cloned().collect())
            .unwrap_or_default(),
        description: str_field(&request, "description")
            .and_then(|d| d.lines().next().map(str::to_string)),
    }
}

/// `{prefix}-{YYYYmmdd-HHMMSS}.json`
pub fn collection_file_name(prefix: &str, time: &DateTime<Local>) -> String {
    format!("{}-{}.json", prefix, time.format("%Y%m%d-%H%M%S"))
}

/// Write the collection as 2-space indented JSON and return the file path
pub async fn save_collection(
    dir: &Path,
    prefix: &str,
    collection: &Value,
) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(collection_file_name(prefix, &Local::now()));
    let content = serde_json::to_string_pretty(collection)?;
    tokio::fs::write(&path, content).await?;
    Ok(path)
}
