//! `docqa ingest` command implementation

use crate::context::CliContext;
use colored::Colorize;
use std::path::PathBuf;

/// Execute the `docqa ingest` command
pub async fn run(ctx: &CliContext, dir: Option<PathBuf>) -> anyhow::Result<()> {
    let dir = dir.unwrap_or_else(|| ctx.config.ingest.docs_dir.clone());
    if !dir.is_dir() {
        anyhow::bail!("document directory not found: {}", dir.display());
    }

    let report = ctx.ingestion_job()?.run(&dir).await?;

    println!();
    println!("  {} {}", "Ingested".green().bold(), dir.display().to_string().cyan());
    println!(
        "    Documents: {}    Chunks: {}    Index vectors: {}",
        report.documents.to_string().yellow(),
        report.chunks.to_string().yellow(),
        report.index_count.to_string().yellow(),
    );
    println!();
    Ok(())
}
