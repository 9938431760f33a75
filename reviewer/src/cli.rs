//! CLI argument definitions

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "code-reviewer")]
#[command(about = "AI code reviewer that remembers your past reviews")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Ollama server URL (default: from .reviewer.toml or http://localhost:11434)
    #[arg(long, env = "OLLAMA_URL", global = true)]
    pub ollama_url: Option<String>,

    /// Model to use (default: from .reviewer.toml or llama3.1:8b)
    #[arg(short = 'm', long, env = "OLLAMA_MODEL", global = true)]
    pub model: Option<String>,

    /// Config file (default: search for .reviewer.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP review service
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(long, short)]
        port: Option<u16>,
    },
    /// Review a file (or stdin) and record it in history
    Review {
        /// File to review; reads stdin when omitted
        file: Option<PathBuf>,
        /// Language tag for the code block
        #[arg(long, short)]
        language: Option<String>,
        /// Identity whose history to use
        #[arg(long, short, default_value = "default")]
        user: String,
    },
    /// Show stored review history
    History {
        /// Identity whose history to show
        #[arg(long, short, default_value = "default")]
        user: String,
        /// Print raw JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}
