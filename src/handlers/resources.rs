use crate::cli::ResourcesCommand;
use crate::handlers::{Context, HandlerError};

pub async fn run(ctx: &Context, command: ResourcesCommand) -> Result<(), HandlerError> {
    let client = ctx.client()?;
    let r = &ctx.renderer;

    match command {
        ResourcesCommand::List { server_id } => {
            let resources = client.list_resources(&server_id).await?;
            println!("{}", r.heading(&format!("Resources on '{}':", server_id)));
            if resources.is_empty() {
                println!("   No resources available");
            }
            for resource in &resources {
                for line in r.resource_lines(resource) {
                    println!("   {}", line);
                }
            }
        }
        ResourcesCommand::Read { server_id, uri } => {
            let content = client.read_resource(&server_id, &uri).await?;
            println!("{}", r.format_json(&content));
        }
    }
    Ok(())
}
