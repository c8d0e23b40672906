use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;

use commands::Commands;

#[derive(Parser)]
#[command(name = "vkfan", version, about = "Batched VK API client")]
struct Cli {
    /// Config file (default: ~/.vkfan/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let path = config::resolve_path(cli.config)?;
    cli.command.run(path).await
}
