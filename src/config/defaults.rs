// Built-in defaults used when the config file omits a value
use super::types::{AgentConfig, BridgeConfig, Config, OutputConfig, TimeoutConfig};
use crate::core::agent::llm::{DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_TIMEOUT};
use crate::core::agent::session::DEFAULT_MAX_TOOL_STEPS;
use crate::core::bridge::url::DEFAULT_BRIDGE_URL;
use crate::core::render::DEFAULT_JSON_WIDTH;

pub const DEFAULT_REQUEST_SECS: u64 = 30;
pub const DEFAULT_TOOL_SECS: u64 = 6000;
pub const DEFAULT_DISCOVERY_SECS: u64 = 180;
pub const DEFAULT_AGENT_REQUEST_SECS: u64 = DEFAULT_GEMINI_TIMEOUT.as_secs();

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_REQUEST_SECS,
            tool_secs: DEFAULT_TOOL_SECS,
            discovery_secs: DEFAULT_DISCOVERY_SECS,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BRIDGE_URL.to_string(),
            port: None,
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_GEMINI_MODEL.to_string(),
            max_tool_steps: DEFAULT_MAX_TOOL_STEPS,
            show_json: true,
            json_width: DEFAULT_JSON_WIDTH,
            request_secs: DEFAULT_AGENT_REQUEST_SECS,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            collections_dir: ".".into(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bridge: BridgeConfig::default(),
            agent: AgentConfig::default(),
            output: OutputConfig::default(),
        }
    }
}
