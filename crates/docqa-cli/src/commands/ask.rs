//! `docqa ask` command implementation

use crate::context::CliContext;
use colored::Colorize;
use docqa_foundation::rag::PipelineOutput;

/// Execute the `docqa ask` command
pub async fn run(ctx: &CliContext, query: &str, json: bool) -> anyhow::Result<()> {
    let pipeline = ctx.pipeline().await?;
    let output = pipeline.run(query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output.into_response())?);
    } else {
        print_answer(&output);
    }
    Ok(())
}

fn print_answer(output: &PipelineOutput) {
    println!();
    println!("  {}", output.answer.bold());
    println!();
    if !output.validated {
        return;
    }
    println!(
        "  {} {}",
        "Confidence:".dimmed(),
        format!("{:.2}", output.confidence()).yellow()
    );
    for (i, chunk) in output.retrieval.chunks.iter().enumerate() {
        let preview: String = chunk.content.chars().take(80).collect();
        println!(
            "  {} [{:.2}] {}",
            format!("{}.", i + 1).dimmed(),
            chunk.score,
            preview.replace('\n', " ")
        );
    }
    println!();
}
