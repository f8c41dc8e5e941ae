//! MCP Bridge REST client
//!
//! Everything needed to talk to a running bridge:
//! - Typed payloads for servers, tools, resources, prompts and confirmations
//! - URL construction with percent-encoded path segments
//! - A pluggable HTTP transport (isahc in production, scripted in tests)
//! - Unwrapping of the double-encoded tool result envelope
//! - Postman collection request shapes and local persistence

pub mod client;
pub mod envelope;
pub mod postman;
pub mod transport;
pub mod types;
pub mod url;

pub use client::{BridgeClient, RequestTimeouts};
pub use envelope::{unwrap_tool_result, EnvelopeError, ToolPayload};
pub use postman::{
    CollectionMetadata, CollectionSummary, GeneratedCollection, PostmanTarget, RemoteTarget,
    StdioTarget,
};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, IsahcTransport, TransportError};
pub use types::*;
pub use url::{build_url, normalize_base_url, Route, UrlError};
