use crate::cli::PromptsCommand;
use crate::handlers::{parse_json_object, Context, HandlerError};

pub async fn run(ctx: &Context, command: PromptsCommand) -> Result<(), HandlerError> {
    let client = ctx.client()?;
    let r = &ctx.renderer;

    match command {
        PromptsCommand::List { server_id } => {
            let prompts = client.list_prompts(&server_id).await?;
            println!("{}", r.heading(&format!("Prompts on '{}':", server_id)));
            if prompts.is_empty() {
                println!("   No prompts available");
            }
            for prompt in &prompts {
                for line in r.prompt_lines(prompt) {
                    println!("   {}", line);
                }
            }
        }
        PromptsCommand::Run {
            server_id,
            prompt_name,
            args,
        } => {
            let arguments = parse_json_object(&args)?;
            let result = client
                .execute_prompt(&server_id, &prompt_name, &arguments)
                .await?;
            println!("{}", r.format_json(&result));
        }
    }
    Ok(())
}
