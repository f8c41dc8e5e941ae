//! Interactive Gemini agent

use crate::cli::AgentArgs;
use crate::core::agent::{AgentSession, GeminiChat};
use crate::handlers::input::{is_exit_command, prompt_line};
use crate::handlers::operator::TerminalOperator;
use crate::handlers::{Context, HandlerError};

pub async fn run(ctx: &Context, args: AgentArgs) -> Result<(), HandlerError> {
    let agent_config = &ctx.config.agent;
    let mut renderer = ctx.renderer.clone();
    renderer.show_json = agent_config.show_json && !args.hide_json;
    renderer.json_width = args.json_width.unwrap_or(agent_config.json_width);
    let model = args.model.as_deref().unwrap_or(&agent_config.model);
    let max_steps = args.max_tool_steps.unwrap_or(agent_config.max_tool_steps);

    let client = ctx.client()?;
    println!("{}", renderer.bold("MCP-Gemini Agent with Multi-Step Reasoning"));
    if !renderer.show_json {
        println!("{}", renderer.warn("JSON result display is disabled"));
    }
    println!("Connecting to MCP Bridge at {}...", client.base_url());
    println!();

    let health = client.health().await?;
    println!(
        "{}",
        renderer.success(&format!(
            "Connected to MCP Bridge: {} servers found",
            health.server_count
        ))
    );

    let chat = GeminiChat::from_env(model)?.with_timeout(agent_config.request_timeout());
    println!("{}", renderer.success(&format!("Gemini model {} configured", model)));

    let mut operator = TerminalOperator::new(renderer.clone());
    let mut session = AgentSession::start(client, chat, max_steps, &mut operator).await?;

    println!();
    println!("{}", renderer.bold("Starting chat session. Type 'exit' to quit."));
    println!();

    loop {
        let Some(line) = prompt_line("You: ")? else {
            break;
        };
        if is_exit_command(&line) {
            break;
        }
        if line.is_empty() {
            continue;
        }

        if let Err(e) = session.handle_user_message(&line, &mut operator).await {
            println!("{}", renderer.error(&e.to_string()));
        }
        println!();
        println!("{}", "-".repeat(50));
        println!();
    }
    Ok(())
}
