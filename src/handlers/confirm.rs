use crate::handlers::{Context, HandlerError};

pub async fn run(ctx: &Context, confirmation_id: &str, approve: bool) -> Result<(), HandlerError> {
    let client = ctx.client()?;
    let r = &ctx.renderer;

    let result = client.resolve_confirmation(confirmation_id, approve).await?;
    let verb = if approve { "approved" } else { "rejected" };
    println!("{}", r.success(&format!("Operation {} {}", confirmation_id, verb)));
    if approve {
        println!("{}", r.tool_result(&result));
    }
    Ok(())
}
