use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mcpbridge")]
#[command(version = concat!("Ver:", env!("CARGO_PKG_VERSION")))]
#[command(about = "Client for the MCP Bridge REST API with a Gemini-driven tool agent")]
pub struct Cli {
    /// MCP Bridge URL including protocol and port
    #[arg(long, visible_alias = "mcp-url", global = true)]
    pub url: Option<String>,

    /// Override the port of the bridge URL
    #[arg(long, visible_alias = "mcp-port", global = true)]
    pub port: Option<u16>,

    /// Alternative config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the bridge is up
    Health,

    /// Manage servers connected to the bridge
    #[command(subcommand)]
    Servers(ServersCommand),

    /// List and execute tools
    #[command(subcommand)]
    Tools(ToolsCommand),

    /// List and read resources
    #[command(subcommand)]
    Resources(ResourcesCommand),

    /// List and run prompts
    #[command(subcommand)]
    Prompts(PromptsCommand),

    /// Approve or reject a pending risky operation
    #[command(group(ArgGroup::new("decision").required(true).args(["approve", "reject"])))]
    Confirm {
        /// Confirmation id returned by the bridge
        confirmation_id: String,
        #[arg(long)]
        approve: bool,
        #[arg(long)]
        reject: bool,
    },

    /// Generate a Postman collection for an MCP server
    Postman(PostmanArgs),

    /// Walk through the math server tools
    Demo {
        /// Run the extended operation list
        #[arg(long)]
        advanced: bool,
        /// Server to use (default: first server whose id contains "math")
        #[arg(long)]
        server: Option<String>,
    },

    /// Interactive Gemini agent that can call bridge tools
    Agent(AgentArgs),

    /// Probe how long the bridge keeps a request open
    TimeoutTest {
        /// Duration in minutes; without it a 1-minute check runs before the 20-minute test
        minutes: Option<f64>,
        /// Client-side timeout in seconds (default: wait indefinitely)
        #[arg(long)]
        client_timeout: Option<f64>,
        /// Do not ask before starting the long test
        #[arg(short, long)]
        yes: bool,
    },

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ServersCommand {
    /// List connected servers
    List,

    /// Connect a new server
    Add(AddServerArgs),

    /// Disconnect a server
    Remove { server_id: String },

    /// Check that a server is listed and answers a tool listing
    Verify { server_id: String },
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "command"])))]
pub struct AddServerArgs {
    /// Server definition file (TOML)
    #[arg(long, conflicts_with_all = ["id", "args", "env", "docker_image"])]
    pub file: Option<PathBuf>,

    /// Unique server id
    #[arg(requires = "command")]
    pub id: Option<String>,

    /// Command that starts the server (python, node, npx, ...)
    #[arg(long)]
    pub command: Option<String>,

    /// Argument passed to the command, repeatable
    #[arg(long = "arg", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Environment variable KEY=VALUE, repeatable
    #[arg(long = "env", value_parser = parse_key_value)]
    pub env: Vec<(String, String)>,

    /// 1 = low, 2 = medium (confirmation), 3 = high (Docker)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub risk_level: u8,

    /// Docker image for high-risk servers
    #[arg(long)]
    pub docker_image: Option<String>,

    /// Extra docker run option, repeatable
    #[arg(long = "docker-option", allow_hyphen_values = true)]
    pub docker_options: Vec<String>,

    /// Verify the server after connecting
    #[arg(long)]
    pub verify: bool,
}

#[derive(Subcommand, Debug)]
pub enum ToolsCommand {
    /// List tools of one server, or of every server
    List {
        server_id: Option<String>,
        /// Use the flat `/tools` route
        #[arg(long)]
        routed: bool,
    },

    /// Tool descriptions with parameters for every server
    Catalog,

    /// Execute a tool
    Call {
        server_id: String,
        tool_name: String,
        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
        /// Use the flat `/tools/{tool}?server=` route
        #[arg(long)]
        routed: bool,
        /// Print the raw response instead of the unwrapped result
        #[arg(long)]
        raw: bool,
        /// Approve a confirmation request without asking
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ResourcesCommand {
    List { server_id: String },
    /// Read a resource by URI
    Read { server_id: String, uri: String },
}

#[derive(Subcommand, Debug)]
pub enum PromptsCommand {
    List {
        server_id: String,
    },
    /// Execute a prompt
    Run {
        server_id: String,
        prompt_name: String,
        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["server_url", "server_command"])))]
pub struct PostmanArgs {
    /// Remote (HTTP/SSE) MCP server URL
    #[arg(long)]
    pub server_url: Option<String>,

    #[arg(long, default_value = "http")]
    pub server_type: String,

    #[arg(long, requires = "server_url")]
    pub auth_token: Option<String>,

    /// Command of a stdio MCP server
    #[arg(long)]
    pub server_command: Option<String>,

    #[arg(long = "server-arg", allow_hyphen_values = true, requires = "server_command")]
    pub server_args: Vec<String>,

    #[arg(long = "server-env", value_parser = parse_key_value, requires = "server_command")]
    pub server_env: Vec<(String, String)>,

    /// Directory for the saved collection (default: config output.collections_dir)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long, default_value = "mcp-server-postman-collection")]
    pub prefix: String,

    /// Print the summary without saving
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Args, Debug)]
pub struct AgentArgs {
    /// Hide JSON results from tool executions
    #[arg(long)]
    pub hide_json: bool,

    /// Maximum width for JSON output
    #[arg(long)]
    pub json_width: Option<usize>,

    /// Gemini model name
    #[arg(long)]
    pub model: Option<String>,

    /// Tool calls allowed per message
    #[arg(long)]
    pub max_tool_steps: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write the default config file
    Init,
    /// Print the effective configuration
    Print,
    /// Validate the configuration
    Check,
}

/// Parse `KEY=VALUE`
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}
