use crate::cli::ConfigCommand;
use crate::config::Config;
use crate::handlers::{Context, HandlerError};

pub fn run(ctx: &Context, command: ConfigCommand) -> Result<(), HandlerError> {
    match command {
        ConfigCommand::Init => {
            Config::init_at(&ctx.config_path)?;
            println!("Created config at {}", ctx.config_path.display());
        }
        ConfigCommand::Print => ctx.config.print()?,
        ConfigCommand::Check => {
            ctx.config.check()?;
            println!("✓ Configuration valid");
        }
    }
    Ok(())
}
