//! `POST /generate-postman` and saving the result

use std::collections::BTreeMap;

use crate::cli::PostmanArgs;
use crate::core::bridge::postman::{save_collection, CollectionSummary, GeneratedCollection};
use crate::core::bridge::{PostmanTarget, RemoteTarget, StdioTarget};
use crate::core::debug_logger::get_debug_logger;
use crate::core::render::ConsoleRenderer;
use crate::handlers::{Context, HandlerError};

pub fn target_from_args(args: &PostmanArgs) -> Result<PostmanTarget, HandlerError> {
    match (&args.server_url, &args.server_command) {
        (Some(url), None) => Ok(PostmanTarget::Remote(RemoteTarget {
            server_url: url.clone(),
            server_type: args.server_type.clone(),
            auth_token: args.auth_token.clone(),
        })),
        (None, Some(command)) => Ok(PostmanTarget::Stdio(StdioTarget {
            server_command: command.clone(),
            server_args: args.server_args.clone(),
            server_env: args.server_env.iter().cloned().collect::<BTreeMap<_, _>>(),
        })),
        _ => Err(HandlerError::Arguments(
            "exactly one of --server-url or --server-command is required".to_string(),
        )),
    }
}

pub async fn run(ctx: &Context, args: PostmanArgs) -> Result<(), HandlerError> {
    let client = ctx.client()?;
    let r = &ctx.renderer;
    let target = target_from_args(&args)?;

    println!("🔄 Discovering {} via {}/generate-postman...", target.label(), client.base_url());
    let generated = match client.generate_postman(&target).await {
        Ok(generated) => generated,
        Err(e) if e.is_timeout() => {
            return Err(HandlerError::Failed(
                "Request timed out - MCP server discovery took too long".to_string(),
            ))
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", r.success("Postman collection generated"));
    print_metadata(&generated);

    if !args.no_save {
        let dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| ctx.config.output.collections_dir.clone());
        let path = save_collection(&dir, &args.prefix, &generated.collection).await?;
        get_debug_logger().collection_saved(&path, generated.collection.to_string().len());
        println!();
        println!("💾 Collection saved to: {}", path.display());
    }

    print_summary(r, &CollectionSummary::from_value(&generated.collection));
    Ok(())
}

fn print_metadata(generated: &GeneratedCollection) {
    let meta = &generated.metadata;
    if let Some(url) = &meta.server_url {
        println!("   Server URL: {}", url);
    }
    println!("   Tools discovered: {}", meta.tools_count);
    println!("   Resources discovered: {}", meta.resources_count);
    println!("   Prompts discovered: {}", meta.prompts_count);
    if let Some(at) = &meta.generated_at {
        println!("   Generated at: {}", at);
    }
}

fn print_summary(r: &ConsoleRenderer, summary: &CollectionSummary) {
    println!();
    println!("{}", r.heading("📋 Generated Collection Analysis:"));
    println!("   Collection Name: {}", summary.name);
    if let Some(schema) = &summary.schema {
        println!("   Schema Version: {}", schema);
    }
    println!("   Total Folders: {}", summary.folders.len());

    for folder in &summary.folders {
        match folder.requests {
            Some(count) => {
                println!("     📁 {}: {} requests", folder.name, count);
                if folder.name == "Tools" {
                    for name in &folder.sample_requests {
                        println!("       🔧 {}", name);
                    }
                    if count > folder.sample_requests.len() {
                        println!(
                            "       ... and {} more tools",
                            count - folder.sample_requests.len()
                        );
                    }
                }
            }
            None => println!("     📄 {}: single request", folder.name),
        }
    }

    if !summary.variables.is_empty() {
        println!("   Environment Variables: {}", summary.variables.len());
        for var in &summary.variables {
            println!(
                "     🔧 {}: {}",
                var.key,
                var.value.as_deref().unwrap_or("N/A")
            );
        }
    }

    if let Some(sample) = &summary.sample_tool {
        println!();
        println!("🔧 Sample Tool Request ('{}'):", sample.name);
        println!("   Method: {}", sample.method);
        println!("   URL: {}", sample.url);
        if let Some(method) = &sample.rpc_method {
            println!("   JSON-RPC Method: {}", method);
        }
        if let Some(tool) = &sample.tool_name {
            println!("   Tool Name: {}", tool);
        }
        if !sample.argument_names.is_empty() {
            println!("   Parameters: {}", sample.argument_names.join(", "));
        }
        if let Some(description) = &sample.description {
            println!("   Description: {}", description);
        }
    }

    println!();
    println!("📊 Total size: {} characters", summary.size_chars);
}
