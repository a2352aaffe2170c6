//! `docqa serve` command implementation

use crate::context::CliContext;
use colored::Colorize;
use docqa_gateway::server::{QueryServer, QueryServerConfig};

/// Execute the `docqa serve` command
pub async fn run(ctx: &CliContext, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let server_config = QueryServerConfig {
        host: host.unwrap_or_else(|| ctx.config.server.host.clone()),
        port: port.unwrap_or(ctx.config.server.port),
    };
    let pipeline = ctx.pipeline().await?;

    println!(
        "{} DocQA gateway on {}",
        "→".green(),
        format!("http://{}", server_config.addr()).cyan()
    );
    QueryServer::new(server_config, pipeline).start().await?;
    Ok(())
}
