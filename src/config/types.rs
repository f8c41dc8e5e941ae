use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::bridge::url::{apply_port_override, normalize_base_url, validate_base_url, UrlError};
use crate::core::bridge::RequestTimeouts;

pub const CONFIG_PATH_ENV: &str = "MCPBRIDGE_CONFIG";
/// Checked before `BRIDGE_URL`
pub const BRIDGE_URL_ENVS: [&str; 2] = ["MCP_BRIDGE_URL", "BRIDGE_URL"];

pub const MIN_JSON_WIDTH: usize = 20;

/// `~/.mcp-bridge/config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bridge: BridgeConfig,
    pub agent: AgentConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub url: String,
    /// Replaces the port of `url` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub timeouts: TimeoutConfig,
}

/// Seconds; 0 disables the timeout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub request_secs: u64,
    pub tool_secs: u64,
    pub discovery_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub model: String,
    /// Tool calls allowed per user message
    pub max_tool_steps: usize,
    pub show_json: bool,
    pub json_width: usize,
    /// Seconds per Gemini call; 0 disables the timeout
    pub request_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub collections_dir: PathBuf,
}

fn secs(value: u64) -> Option<Duration> {
    (value > 0).then(|| Duration::from_secs(value))
}

impl AgentConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        secs(self.request_secs)
    }
}

impl TimeoutConfig {
    pub fn to_request_timeouts(&self) -> RequestTimeouts {
        RequestTimeouts {
            default: secs(self.request_secs),
            tool_execution: secs(self.tool_secs),
            discovery: secs(self.discovery_secs),
        }
    }
}

impl Config {
    /// `~/.mcp-bridge`, or `./.mcp-bridge` without a home directory
    pub fn base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".mcp-bridge")
    }

    pub fn default_path() -> PathBuf {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => Self::base_dir().join("config.toml"),
        }
    }

    /// Load the default file and apply environment overrides
    pub fn load() -> Result<Config, ConfigError> {
        let mut config = Self::load_from(&Self::default_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load a file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Bridge URL from `MCP_BRIDGE_URL`, falling back to `BRIDGE_URL`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = BRIDGE_URL_ENVS
            .iter()
            .filter_map(|key| lookup(key))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty());
        if let Some(url) = url {
            self.bridge.url = url;
        }
    }

    /// Command-line flags win over everything else
    pub fn apply_cli(&mut self, url: Option<&str>, port: Option<u16>) {
        if let Some(url) = url {
            self.bridge.url = url.trim().to_string();
        }
        if port.is_some() {
            self.bridge.port = port;
        }
    }

    /// Normalized bridge URL with the port override applied
    pub fn base_url(&self) -> Result<String, UrlError> {
        let url = normalize_base_url(&self.bridge.url);
        match self.bridge.port {
            Some(port) => apply_port_override(&url, port),
            None => {
                validate_base_url(&url)?;
                Ok(url)
            }
        }
    }

    pub fn request_timeouts(&self) -> RequestTimeouts {
        self.bridge.timeouts.to_request_timeouts()
    }

    /// Write the defaults to the default path
    pub fn init() -> Result<PathBuf, ConfigError> {
        let path = Self::default_path();
        Self::init_at(&path)?;
        Ok(path)
    }

    /// Write the defaults to `path`; never overwrites
    pub fn init_at(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Config::default().to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn print(&self) -> Result<(), ConfigError> {
        print!("{}", self.to_toml()?);
        Ok(())
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        self.base_url()
            .map_err(|e| ConfigError::Invalid(format!("bridge.url: {}", e)))?;
        if self.agent.json_width < MIN_JSON_WIDTH {
            return Err(ConfigError::Invalid(format!(
                "agent.json_width must be at least {}",
                MIN_JSON_WIDTH
            )));
        }
        if self.agent.max_tool_steps == 0 {
            return Err(ConfigError::Invalid(
                "agent.max_tool_steps must be at least 1".to_string(),
            ));
        }
        if self.agent.model.trim().is_empty() {
            return Err(ConfigError::Invalid("agent.model must not be empty".to_string()));
        }
        Ok(())
    }
}
