//! DocQA CLI - serve, ask and ingest

mod cli;
mod commands;
mod context;

use clap::Parser;
use cli::{Cli, Commands, LogFormat};
use context::CliContext;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_command(cli))
}

fn init_logging(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let bootstrap_index = matches!(cli.command, Commands::Ingest { .. });
    let ctx = CliContext::load(cli.config.as_deref(), bootstrap_index).await?;

    match cli.command {
        Commands::Serve { host, port } => commands::serve::run(&ctx, host, port).await,
        Commands::Ask { query, json } => commands::ask::run(&ctx, &query, json).await,
        Commands::Ingest { dir } => commands::ingest::run(&ctx, dir).await,
    }
}
