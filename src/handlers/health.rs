use crate::core::bridge::url::is_default_base_url;
use crate::handlers::{Context, HandlerError};

pub async fn run(ctx: &Context) -> Result<(), HandlerError> {
    let client = ctx.client()?;
    let r = &ctx.renderer;

    println!("Checking MCP Bridge at {}...", client.base_url());
    if is_default_base_url(client.base_url()) {
        println!(
            "{}",
            r.dim("   (default URL; use --url or MCP_BRIDGE_URL for a remote bridge)")
        );
    }
    let health = client.health().await?;

    for line in r.health_summary(&health) {
        println!("   {}", line);
    }
    if health.is_ok() {
        println!("{}", r.success("MCP Bridge is running"));
        Ok(())
    } else {
        Err(HandlerError::Failed(format!(
            "MCP Bridge reported status '{}'",
            health.status_text()
        )))
    }
}
