use mcpbridge::cli::Cli;
use mcpbridge::core::render::ConsoleRenderer;
use mcpbridge::handlers::dispatch;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse_args();

    let mut renderer = ConsoleRenderer::default();
    renderer.color = !cli.no_color;

    if let Err(e) = dispatch(cli).await {
        eprintln!("{}", renderer.error(&e.to_string()));
        if let Some(hint) = e.hint() {
            eprintln!("{}", renderer.dim(&hint));
        }
        std::process::exit(e.exit_code());
    }
}
