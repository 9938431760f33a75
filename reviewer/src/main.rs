use anyhow::Result;
use clap::Parser;

use code_reviewer::cli::{Cli, Commands};
use code_reviewer::handlers::{self, CommandContext};
use code_reviewer::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_tracing(cli.verbose)?;

    let file_config = CommandContext::load_config(cli.config.as_deref())?;
    let ctx = CommandContext::new(cli.ollama_url, cli.model, file_config);

    match cli.command {
        Commands::Serve { host, port } => handlers::run_serve(&ctx, host, port).await?,
        Commands::Review {
            file,
            language,
            user,
        } => handlers::run_review(&ctx, file.as_deref(), language, &user).await?,
        Commands::History { user, json } => handlers::run_history(&ctx, &user, json).await?,
    }

    Ok(())
}
