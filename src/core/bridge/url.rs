//! URL Construction for Bridge Endpoints
//!
//! - Base URL normalization and port override
//! - Route → path mapping for every REST endpoint
//! - Percent-encoding of dynamic path segments (resource URIs, ids, names)

use url::Url;

pub const DEFAULT_BRIDGE_URL: &str = "http://localhost:3000";

#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error("Invalid URL format: {0}")]
    ParseError(#[from] url::ParseError),
    #[error("Missing host in URL")]
    MissingHost,
    #[error("URL cannot carry a port: {0}")]
    CannotHavePort(String),
}

/// Normalize base URL by trimming trailing slashes
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Replace the port of `base_url`, keeping scheme, host and path
///
/// # Examples
/// - `http://localhost:3000` + 4000 → `http://localhost:4000`
/// - `http://192.168.1.100:3000/bridge` + 8080 → `http://192.168.1.100:8080/bridge`
/// - `https://bridge.example.com` + 8443 → `https://bridge.example.com:8443`
pub fn apply_port_override(base_url: &str, port: u16) -> Result<String, UrlError> {
    let mut url = Url::parse(base_url)?;
    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }
    url.set_port(Some(port))
        .map_err(|_| UrlError::CannotHavePort(base_url.to_string()))?;
    Ok(normalize_base_url(url.as_str()))
}

/// Validate that a base URL is absolute http(s) with a host
pub fn validate_base_url(base_url: &str) -> Result<(), UrlError> {
    let url = Url::parse(base_url)?;
    url.host_str().ok_or(UrlError::MissingHost)?;
    Ok(())
}

/// True when the URL is the local development default
pub fn is_default_base_url(base_url: &str) -> bool {
    normalize_base_url(base_url).eq_ignore_ascii_case(DEFAULT_BRIDGE_URL)
}

/// Extract host from URL, for log fields
pub fn extract_host(url_str: &str) -> Result<String, UrlError> {
    let url = Url::parse(url_str)?;
    url.host_str()
        .map(|h| h.to_string())
        .ok_or(UrlError::MissingHost)
}

/// Percent-encode one path segment
///
/// Everything except ASCII alphanumerics and `-_.~` is escaped, so
/// `file:///tmp/a b.txt` becomes `file%3A%2F%2F%2Ftmp%2Fa%20b.txt`.
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Bridge REST endpoints
#[derive(Debug, Clone, PartialEq)]
pub enum Route<'a> {
    Health,
    Servers,
    Server(&'a str),
    ServerTools(&'a str),
    ServerTool { server: &'a str, tool: &'a str },
    ServerResources(&'a str),
    ServerResource { server: &'a str, uri: &'a str },
    ServerPrompts(&'a str),
    ServerPrompt { server: &'a str, prompt: &'a str },
    Confirmation(&'a str),
    GeneratePostman,
    /// Flat listing exposed by deployed bridges: `/tools[?server=]`
    Tools { server: Option<&'a str> },
    /// Flat execution exposed by deployed bridges: `/tools/{tool}[?server=]`
    Tool { tool: &'a str, server: Option<&'a str> },
    TimeoutTest(&'a str),
}

impl Route<'_> {
    /// Path and query, always starting with `/`
    pub fn path(&self) -> String {
        match self {
            Route::Health => "/health".to_string(),
            Route::Servers => "/servers".to_string(),
            Route::Server(id) => format!("/servers/{}", encode_segment(id)),
            Route::ServerTools(id) => format!("/servers/{}/tools", encode_segment(id)),
            Route::ServerTool { server, tool } => format!(
                "/servers/{}/tools/{}",
                encode_segment(server),
                encode_segment(tool)
            ),
            Route::ServerResources(id) => format!("/servers/{}/resources", encode_segment(id)),
            Route::ServerResource { server, uri } => format!(
                "/servers/{}/resources/{}",
                encode_segment(server),
                encode_segment(uri)
            ),
            Route::ServerPrompts(id) => format!("/servers/{}/prompts", encode_segment(id)),
            Route::ServerPrompt { server, prompt } => format!(
                "/servers/{}/prompts/{}",
                encode_segment(server),
                encode_segment(prompt)
            ),
            Route::Confirmation(id) => format!("/confirmations/{}", encode_segment(id)),
            Route::GeneratePostman => "/generate-postman".to_string(),
            Route::Tools { server } => with_server_query("/tools".to_string(), *server),
            Route::Tool { tool, server } => {
                with_server_query(format!("/tools/{}", encode_segment(tool)), *server)
            }
            Route::TimeoutTest(minutes) => format!("/test/timeout/{}", encode_segment(minutes)),
        }
    }
}

fn with_server_query(path: String, server: Option<&str>) -> String {
    match server {
        Some(server) => format!("{}?server={}", path, encode_segment(server)),
        None => path,
    }
}

/// Join a normalized base URL with a route path
pub fn build_url(base_url: &str, route: &Route<'_>) -> String {
    format!("{}{}", normalize_base_url(base_url), route.path())
}

/// Format timeout minutes the way the bridge route expects (`20`, `1.5`)
pub fn format_minutes(minutes: f64) -> String {
    if minutes.fract() == 0.0 && minutes.abs() < 1e15 {
        format!("{}", minutes as i64)
    } else {
        format!("{}", minutes)
    }
}
