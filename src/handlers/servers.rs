//! Server registration, removal and verification

use std::collections::BTreeMap;
use std::path::Path;

use crate::cli::{AddServerArgs, ServersCommand};
use crate::core::bridge::{
    BridgeClient, BridgeError, DockerOptions, NewServer, RegisteredServer, ToolDescriptor,
};
use crate::core::render::ConsoleRenderer;
use crate::handlers::{Context, HandlerError};

const SHOWN_TOOLS: usize = 5;

#[derive(Debug)]
pub enum AddOutcome {
    Connected(RegisteredServer),
    /// HTTP 409
    AlreadyExists,
}

#[derive(Debug)]
pub enum RemoveOutcome {
    Removed,
    /// HTTP 404
    NotFound,
}

/// Result of checking a connected server
#[derive(Debug)]
pub enum VerifyOutcome {
    NotListed,
    Responding {
        pid: Option<u32>,
        tools: Vec<ToolDescriptor>,
    },
    NotResponding {
        pid: Option<u32>,
        error: BridgeError,
    },
}

impl VerifyOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, VerifyOutcome::Responding { .. })
    }
}

pub async fn run(ctx: &Context, command: ServersCommand) -> Result<(), HandlerError> {
    let client = ctx.client()?;
    let r = &ctx.renderer;

    match command {
        ServersCommand::List => list(&client, r).await,
        ServersCommand::Add(args) => {
            let server = new_server_from_args(&args)?;
            let verify_after = args.verify;
            match add(&client, r, &server).await? {
                AddOutcome::Connected(_) if verify_after => {
                    let outcome = verify(&client, r, &server.id).await;
                    if outcome.is_ok() {
                        println!();
                        println!("{}", r.success("Your MCP server is connected and working!"));
                        Ok(())
                    } else {
                        println!();
                        println!("{}", r.warn("Server connected but not responding properly."));
                        println!("   Check your server logs and configuration.");
                        Err(HandlerError::Failed(format!(
                            "server '{}' failed verification",
                            server.id
                        )))
                    }
                }
                AddOutcome::Connected(_) | AddOutcome::AlreadyExists => Ok(()),
            }
        }
        ServersCommand::Remove { server_id } => {
            remove(&client, r, &server_id).await?;
            Ok(())
        }
        ServersCommand::Verify { server_id } => {
            if verify(&client, r, &server_id).await.is_ok() {
                Ok(())
            } else {
                Err(HandlerError::Failed(format!(
                    "server '{}' failed verification",
                    server_id
                )))
            }
        }
    }
}

async fn list(client: &BridgeClient, r: &ConsoleRenderer) -> Result<(), HandlerError> {
    let servers = client.list_servers().await?;
    println!("{}", r.heading("Connected Servers:"));
    if servers.is_empty() {
        println!("   No servers connected");
    }
    for server in &servers {
        for line in r.server_lines(server) {
            println!("   {}", line);
        }
    }
    Ok(())
}

/// Build the registration body from a definition file or flags
pub fn new_server_from_args(args: &AddServerArgs) -> Result<NewServer, HandlerError> {
    if let Some(path) = &args.file {
        return load_server_file(path);
    }

    let (Some(id), Some(command)) = (&args.id, &args.command) else {
        return Err(HandlerError::Arguments(
            "a server id and --command are required without --file".to_string(),
        ));
    };

    let mut server = NewServer::new(id.clone(), command.clone(), args.args.clone());
    server.env = args.env.iter().cloned().collect::<BTreeMap<_, _>>();
    server.risk_level = args.risk_level;
    server.docker = args.docker_image.as_ref().map(|image| DockerOptions {
        image: image.clone(),
        options: args.docker_options.clone(),
    });
    Ok(server)
}

pub fn load_server_file(path: &Path) -> Result<NewServer, HandlerError> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| {
        HandlerError::Arguments(format!("invalid server file {}: {}", path.display(), e))
    })
}

pub async fn add(
    client: &BridgeClient,
    r: &ConsoleRenderer,
    server: &NewServer,
) -> Result<AddOutcome, HandlerError> {
    println!("🔌 Connecting server '{}' to MCP Bridge...", server.id);
    println!("   Command: {}", server.command_line());

    match client.register_server(server).await {
        Ok(registered) => {
            for line in r.registered_server(&registered) {
                println!("{}", line);
            }
            Ok(AddOutcome::Connected(registered))
        }
        Err(e) if e.status() == Some(409) => {
            println!("{}", r.warn(&format!("Server '{}' already exists", server.id)));
            Ok(AddOutcome::AlreadyExists)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn remove(
    client: &BridgeClient,
    r: &ConsoleRenderer,
    server_id: &str,
) -> Result<RemoveOutcome, HandlerError> {
    println!("🔌 Disconnecting server '{}'...", server_id);

    match client.remove_server(server_id).await {
        Ok(_) => {
            println!(
                "{}",
                r.success(&format!("Server '{}' disconnected successfully", server_id))
            );
            Ok(RemoveOutcome::Removed)
        }
        Err(e) if e.status() == Some(404) => {
            println!("{}", r.warn(&format!("Server '{}' was not found", server_id)));
            Ok(RemoveOutcome::NotFound)
        }
        Err(e) => Err(e.into()),
    }
}

/// Listed in `/servers` and answering a tool listing
pub async fn verify(client: &BridgeClient, r: &ConsoleRenderer, server_id: &str) -> VerifyOutcome {
    println!("🧪 Testing server '{}'...", server_id);

    let servers = match client.list_servers().await {
        Ok(servers) => servers,
        Err(e) => {
            println!("{}", r.error(&format!("Error testing server: {}", e)));
            return VerifyOutcome::NotResponding { pid: None, error: e };
        }
    };

    let Some(server) = servers.iter().find(|s| s.id == server_id) else {
        println!(
            "{}",
            r.error(&format!("Server '{}' not found in server list", server_id))
        );
        return VerifyOutcome::NotListed;
    };
    let pid = server.pid;
    println!(
        "{}",
        r.success(&format!(
            "Server found in list (PID: {})",
            pid.map(|p| p.to_string()).unwrap_or_else(|| "n/a".to_string())
        ))
    );

    match client.list_tools(server_id).await {
        Ok(tools) => {
            println!(
                "{}",
                r.success(&format!("Server responding - {} tools available", tools.len()))
            );
            if tools.is_empty() {
                println!("   No tools available (this might be normal)");
            } else {
                println!("   Available tools:");
                for tool in tools.iter().take(SHOWN_TOOLS) {
                    println!("      📦 {}", tool.name);
                }
                if tools.len() > SHOWN_TOOLS {
                    println!("      ... and {} more", tools.len() - SHOWN_TOOLS);
                }
            }
            VerifyOutcome::Responding { pid, tools }
        }
        Err(e) => {
            println!(
                "{}",
                r.error(&format!("Server not responding to tools request: {}", e))
            );
            VerifyOutcome::NotResponding { pid, error: e }
        }
    }
}
