//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// DocQA - answer questions from an indexed document corpus
#[derive(Parser, Debug)]
#[command(name = "docqa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Configuration file path (yaml, toml or json)
    #[arg(short = 'c', long, global = true, env = "DOCQA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP gateway
    Serve {
        /// Bind address, overrides `server.host`
        #[arg(long)]
        host: Option<String>,

        /// Port, overrides `server.port`
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Answer a single question
    Ask {
        /// The question
        query: String,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load, split, embed and upsert a document directory
    Ingest {
        /// Directory to ingest, overrides `ingest.docs_dir`
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}
