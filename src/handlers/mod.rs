//! Command handlers
//!
//! One module per subcommand. Handlers print progress on stdout and return
//! `HandlerError` for failures that end the command; multi-step flows report
//! failed steps inline and carry on.

pub mod agent;
pub mod config;
pub mod confirm;
pub mod demo;
pub mod health;
pub mod input;
pub mod operator;
pub mod postman;
pub mod prompts;
pub mod resources;
pub mod servers;
pub mod timeout;
pub mod tools;

use std::path::PathBuf;

use crate::cli::{Cli, Commands};
use crate::config::{Config, ConfigError};
use crate::core::agent::AgentError;
use crate::core::bridge::{BridgeClient, BridgeError, UrlError};
use crate::core::render::ConsoleRenderer;

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid bridge URL: {0}")]
    Url(#[from] UrlError),
    #[error("Invalid arguments: {0}")]
    Arguments(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    pub fn exit_code(&self) -> i32 {
        match self {
            HandlerError::Arguments(_) => 2,
            _ => 1,
        }
    }

    /// Follow-up advice printed under the error
    pub fn hint(&self) -> Option<String> {
        match self {
            HandlerError::Bridge(e) | HandlerError::Agent(AgentError::Bridge(e)) => bridge_hint(e),
            HandlerError::Agent(AgentError::MissingApiKey) => Some(
                "Set GEMINI_API_KEY in your environment to use the agent.".to_string(),
            ),
            HandlerError::Config(_) | HandlerError::Url(_) => Some(format!(
                "Check {} or run `mcpbridge config check`.",
                Config::default_path().display()
            )),
            _ => None,
        }
    }
}

fn bridge_hint(error: &BridgeError) -> Option<String> {
    if error.is_unreachable() {
        Some("Make sure the MCP Bridge is running (node mcp-bridge.js).".to_string())
    } else if error.is_timeout() {
        Some("The request timed out; raise [bridge.timeouts] in the config file.".to_string())
    } else {
        None
    }
}

/// Resolved configuration and output settings for one invocation
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub renderer: ConsoleRenderer,
}

impl Context {
    /// file → environment → command-line flags
    pub fn from_cli(cli: &Cli) -> Result<Self, HandlerError> {
        let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
        let mut config = Config::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_cli(cli.url.as_deref(), cli.port);

        // `agent.show_json` applies only inside the agent session
        let mut renderer = ConsoleRenderer::new(true, config.agent.json_width);
        renderer.color = !cli.no_color;

        Ok(Self {
            config,
            config_path,
            renderer,
        })
    }

    pub fn base_url(&self) -> Result<String, HandlerError> {
        Ok(self.config.base_url()?)
    }

    pub fn client(&self) -> Result<BridgeClient, HandlerError> {
        let client = BridgeClient::new(&self.base_url()?)?.with_timeouts(self.config.request_timeouts());
        Ok(client)
    }
}

/// Parse a JSON object given on the command line
pub fn parse_json_object(raw: &str) -> Result<serde_json::Value, HandlerError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| HandlerError::Arguments(format!("arguments must be JSON: {}", e)))?;
    if !value.is_object() {
        return Err(HandlerError::Arguments(
            "arguments must be a JSON object".to_string(),
        ));
    }
    Ok(value)
}

pub async fn dispatch(cli: Cli) -> Result<(), HandlerError> {
    let ctx = Context::from_cli(&cli)?;

    match cli.command {
        Commands::Health => health::run(&ctx).await,
        Commands::Servers(command) => servers::run(&ctx, command).await,
        Commands::Tools(command) => tools::run(&ctx, command).await,
        Commands::Resources(command) => resources::run(&ctx, command).await,
        Commands::Prompts(command) => prompts::run(&ctx, command).await,
        Commands::Confirm {
            confirmation_id,
            approve,
            reject,
        } => confirm::run(&ctx, &confirmation_id, approve && !reject).await,
        Commands::Postman(args) => postman::run(&ctx, args).await,
        Commands::Demo { advanced, server } => demo::run(&ctx, advanced, server.as_deref()).await,
        Commands::Agent(args) => agent::run(&ctx, args).await,
        Commands::TimeoutTest {
            minutes,
            client_timeout,
            yes,
        } => timeout::run(&ctx, minutes, client_timeout, yes).await,
        Commands::Config(command) => config::run(&ctx, command),
    }
}
