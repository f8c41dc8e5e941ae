use serde_json::Value;

use crate::cli::ToolsCommand;
use crate::core::agent::describe_tools;
use crate::core::agent::session::rejected_result;
use crate::core::bridge::{BridgeClient, ConfirmationRequest, ToolExecution};
use crate::core::render::ConsoleRenderer;
use crate::handlers::input::prompt_confirmation;
use crate::handlers::{parse_json_object, Context, HandlerError};

pub async fn run(ctx: &Context, command: ToolsCommand) -> Result<(), HandlerError> {
    let client = ctx.client()?;
    let r = &ctx.renderer;

    match command {
        ToolsCommand::List { server_id, routed } => {
            if routed {
                let tools = client.list_routed_tools(server_id.as_deref()).await?;
                println!("{}", r.heading(&format!("Tools ({}):", tools.len())));
                for tool in &tools {
                    println!("   {}", r.tool_line(tool));
                }
                return Ok(());
            }

            match server_id {
                Some(server_id) => {
                    let tools = client.list_tools(&server_id).await?;
                    println!(
                        "{}",
                        r.heading(&format!("Tools on '{}' ({}):", server_id, tools.len()))
                    );
                    for tool in &tools {
                        for line in r.tool_details(tool) {
                            println!("   {}", line);
                        }
                    }
                }
                None => {
                    for server in client.fetch_tool_catalog().await {
                        println!(
                            "{}",
                            r.heading(&format!(
                                "{} ({} tools):",
                                server.server_id,
                                server.tools.len()
                            ))
                        );
                        for tool in &server.tools {
                            println!("   {}", r.tool_line(tool));
                        }
                    }
                }
            }
            Ok(())
        }
        ToolsCommand::Catalog => {
            let catalog = client.fetch_tool_catalog().await;
            print!("{}", describe_tools(&catalog));
            Ok(())
        }
        ToolsCommand::Call {
            server_id,
            tool_name,
            args,
            routed,
            raw,
            yes,
        } => {
            let arguments = parse_json_object(&args)?;
            let execution = if routed {
                client
                    .execute_routed_tool(&tool_name, &arguments, Some(&server_id))
                    .await?
            } else {
                client.execute_tool(&server_id, &tool_name, &arguments).await?
            };

            let result = match execution {
                ToolExecution::Completed(result) => result,
                ToolExecution::ConfirmationRequired(request) => {
                    resolve_interactively(&client, r, &request, yes).await?
                }
            };

            if raw {
                println!("{}", r.format_json(&result));
            } else {
                println!("{}", r.tool_result(&result));
            }
            Ok(())
        }
    }
}

/// Show the confirmation panel, ask, and report the decision to the bridge
pub async fn resolve_interactively(
    client: &BridgeClient,
    r: &ConsoleRenderer,
    request: &ConfirmationRequest,
    auto_approve: bool,
) -> Result<Value, HandlerError> {
    println!("{}", r.confirmation_panel(request));

    let approved = auto_approve || prompt_confirmation("Do you want to proceed with this operation?")?;
    if approved {
        return Ok(client
            .resolve_confirmation(&request.confirmation_id, true)
            .await?);
    }

    if let Err(e) = client
        .resolve_confirmation(&request.confirmation_id, false)
        .await
    {
        println!("{}", r.warn(&format!("Could not notify the bridge: {}", e)));
    }
    Ok(rejected_result())
}
