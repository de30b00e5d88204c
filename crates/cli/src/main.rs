use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

/// wright - write reproducible executable artifacts into an output tree
#[derive(Parser)]
#[command(name = "wright")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build an artifact from a JSON spec into an output tree
  Build {
    /// Path to the artifact spec (JSON)
    spec: PathBuf,

    /// Root of the output tree
    #[arg(short, long)]
    root: PathBuf,

    /// Override the generator deadline (e.g. "30s", "2m")
    #[arg(long, value_parser = humantime::parse_duration)]
    generator_timeout: Option<Duration>,
  },

  /// Print the SHA-256 content hash of a file, for pinning generated content
  Hash {
    /// File to hash
    file: PathBuf,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt().with_env_filter(filter).without_time().init();

  match cli.command {
    Commands::Build {
      spec,
      root,
      generator_timeout,
    } => cmd::cmd_build(&spec, &root, generator_timeout).await,
    Commands::Hash { file } => cmd::cmd_hash(&file),
  }
}
