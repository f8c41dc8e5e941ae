//! Guided tour of a math MCP server

use serde_json::{json, Value};

use crate::core::bridge::{
    unwrap_tool_result, BridgeClient, ServerDescriptor, ToolExecution, ToolPayload,
};
use crate::core::render::ConsoleRenderer;
use crate::handlers::{Context, HandlerError};

const LISTED_ITEMS: usize = 3;

/// One tool call of the tour
#[derive(Debug, Clone, PartialEq)]
pub struct DemoOperation {
    pub tool: &'static str,
    pub arguments: Value,
    pub label: &'static str,
}

impl DemoOperation {
    fn new(tool: &'static str, arguments: Value, label: &'static str) -> Self {
        Self {
            tool,
            arguments,
            label,
        }
    }
}

pub fn basic_operations() -> Vec<DemoOperation> {
    vec![
        DemoOperation::new("add", json!({"a": 15, "b": 27}), "15 + 27"),
        DemoOperation::new("multiply", json!({"a": 6, "b": 7}), "6 × 7"),
        DemoOperation::new("power", json!({"base": 2, "exponent": 10}), "2^10"),
        DemoOperation::new("quadratic", json!({"a": 1, "b": -5, "c": 6}), "x² - 5x + 6 = 0"),
        DemoOperation::new(
            "mean",
            json!({"values": "[10, 20, 30, 40, 50]"}),
            "mean of [10,20,30,40,50]",
        ),
        DemoOperation::new("sin", json!({"angle": 90, "unit": "degrees"}), "sin(90°)"),
    ]
}

pub fn advanced_operations() -> Vec<DemoOperation> {
    vec![
        DemoOperation::new("power", json!({"base": 2, "exponent": 10}), "2^10"),
        DemoOperation::new("square_root", json!({"number": 144}), "√144"),
        DemoOperation::new("factorial", json!({"number": 5}), "5!"),
        DemoOperation::new("sin", json!({"angle": 1.5708}), "sin(π/2)"),
        DemoOperation::new("cos", json!({"angle": 0}), "cos(0)"),
        DemoOperation::new("tan", json!({"angle": 0.7854}), "tan(π/4)"),
        DemoOperation::new("ln", json!({"number": 2.71828}), "ln(e)"),
        DemoOperation::new("log", json!({"number": 100, "base": 10}), "log₁₀(100)"),
        DemoOperation::new("exp", json!({"x": 1}), "e^1"),
        DemoOperation::new("quadratic", json!({"a": 1, "b": -5, "c": 6}), "x² - 5x + 6 = 0"),
        DemoOperation::new(
            "distance",
            json!({"x1": 0, "y1": 0, "x2": 3, "y2": 4}),
            "distance (0,0) to (3,4)",
        ),
        DemoOperation::new("mean", json!({"numbers": [1, 2, 3, 4, 5]}), "mean of [1,2,3,4,5]"),
        DemoOperation::new(
            "median",
            json!({"numbers": [1, 3, 3, 6, 7, 8, 9]}),
            "median of [1,3,3,6,7,8,9]",
        ),
        DemoOperation::new(
            "complex_add",
            json!({"real1": 3, "imag1": 4, "real2": 1, "imag2": 2}),
            "(3+4i) + (1+2i)",
        ),
    ]
}

/// Explicit choice, else the first id containing "math", else the first server
pub fn pick_demo_server(servers: &[ServerDescriptor], preferred: Option<&str>) -> Option<String> {
    if let Some(preferred) = preferred {
        return Some(preferred.to_string());
    }
    servers
        .iter()
        .find(|s| s.id.to_lowercase().contains("math"))
        .or_else(|| servers.first())
        .map(|s| s.id.clone())
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DemoReport {
    pub succeeded: usize,
    pub failed: usize,
}

pub async fn run(ctx: &Context, advanced: bool, server: Option<&str>) -> Result<(), HandlerError> {
    let client = ctx.client()?;
    let r = &ctx.renderer;

    println!("🔌 MCP Bridge API Demo");
    println!("{}", r.separator(50));

    println!();
    println!("1. Health Check:");
    let health = client.health().await?;
    for line in r.health_summary(&health) {
        println!("   {}", line);
    }

    println!();
    println!("2. Connected Servers:");
    let servers = client.list_servers().await?;
    for server in &servers {
        for line in r.server_lines(server) {
            println!("   {}", line);
        }
    }
    let Some(server_id) = pick_demo_server(&servers, server) else {
        println!("   No servers connected");
        return Ok(());
    };

    println!();
    println!("3. Working with server: {}", server_id);
    let tool_count = match client.list_tools(&server_id).await {
        Ok(tools) => {
            for tool in &tools {
                println!("   {}", r.tool_line(tool));
            }
            println!("   ... Total of {} tools available!", tools.len());
            tools.len()
        }
        Err(e) => {
            println!("   {}", r.error(&format!("Error getting tools: {}", e)));
            return Err(e.into());
        }
    };

    println!();
    println!("4. Testing Math Operations:");
    let operations = if advanced {
        advanced_operations()
    } else {
        basic_operations()
    };
    let mut report = run_operations(&client, r, &server_id, &operations).await;

    if advanced {
        println!();
        println!("🎯 Demonstrating Error Handling...");
        if demonstrate_division_by_zero(&client, r, &server_id).await {
            report.succeeded += 1;
        } else {
            report.failed += 1;
        }
    } else {
        show_resources_and_prompts(&client, r, &server_id).await;
    }

    println!();
    println!(
        "🎉 Demo completed: {} of {} tools exercised successfully ({} available)",
        report.succeeded,
        report.succeeded + report.failed,
        tool_count
    );
    Ok(())
}

/// Run every operation; failures are reported and skipped
pub async fn run_operations(
    client: &BridgeClient,
    r: &ConsoleRenderer,
    server_id: &str,
    operations: &[DemoOperation],
) -> DemoReport {
    let mut report = DemoReport::default();

    for op in operations {
        match call(client, server_id, op).await {
            Ok(ToolPayload::Error(error)) => {
                println!("   {}", r.error(&format!("{} ({}): {}", op.label, op.tool, error)));
                report.failed += 1;
            }
            Ok(payload) => {
                println!("   🔢 {} = {}", op.label, payload.display());
                report.succeeded += 1;
            }
            Err(message) => {
                println!("   {}", r.error(&format!("Error with {}: {}", op.tool, message)));
                report.failed += 1;
            }
        }
    }
    report
}

async fn call(
    client: &BridgeClient,
    server_id: &str,
    op: &DemoOperation,
) -> Result<ToolPayload, String> {
    match client
        .execute_tool(server_id, op.tool, &op.arguments)
        .await
        .map_err(|e| e.to_string())?
    {
        ToolExecution::Completed(raw) => unwrap_tool_result(&raw).map_err(|e| e.to_string()),
        ToolExecution::ConfirmationRequired(request) => Err(format!(
            "requires confirmation {} (risk level {})",
            request.confirmation_id,
            request
                .risk_level
                .map(|l| l.to_string())
                .unwrap_or_else(|| "?".to_string())
        )),
    }
}

/// `divide` by zero must come back as an error
async fn demonstrate_division_by_zero(
    client: &BridgeClient,
    r: &ConsoleRenderer,
    server_id: &str,
) -> bool {
    let op = DemoOperation::new("divide", json!({"a": 10, "b": 0}), "10 / 0");
    match call(client, server_id, &op).await {
        Ok(ToolPayload::Error(error)) => {
            println!(
                "   {}",
                r.success(&format!("Properly caught division by zero: {}", error))
            );
            true
        }
        Err(message) => {
            println!(
                "   {}",
                r.success(&format!("Properly caught division by zero: {}", message))
            );
            true
        }
        Ok(payload) => {
            println!(
                "   {}",
                r.warn(&format!("Division by zero result: {}", payload.display()))
            );
            false
        }
    }
}

async fn show_resources_and_prompts(client: &BridgeClient, r: &ConsoleRenderer, server_id: &str) {
    println!();
    println!("5. Resources on '{}':", server_id);
    match client.list_resources(server_id).await {
        Ok(resources) if resources.is_empty() => println!("   No resources available"),
        Ok(resources) => {
            for resource in resources.iter().take(LISTED_ITEMS) {
                for line in r.resource_lines(resource) {
                    println!("   {}", line);
                }
            }
        }
        Err(e) => println!("   ℹ️  Resources not supported or error: {}", e),
    }

    println!();
    println!("6. Prompts on '{}':", server_id);
    match client.list_prompts(server_id).await {
        Ok(prompts) if prompts.is_empty() => println!("   No prompts available"),
        Ok(prompts) => {
            for prompt in prompts.iter().take(LISTED_ITEMS) {
                for line in r.prompt_lines(prompt) {
                    println!("   {}", line);
                }
            }
        }
        Err(e) => println!("   ℹ️  Prompts not supported or error: {}", e),
    }
}
