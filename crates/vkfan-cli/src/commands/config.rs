use std::path::Path;

use clap::{Args, Subcommand};
use vkfan::{ClientConfig, TOKEN_ENV};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a config file with default settings
    Init {
        /// Access token, repeatable
        #[arg(short, long = "token")]
        tokens: Vec<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config
    Show,
    /// Print the config file location
    Path,
}

pub fn run(args: ConfigArgs, config_path: &Path) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Init { tokens, force } => {
            if config_path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    config_path.display()
                );
            }
            ClientConfig::with_tokens(tokens).save(config_path)?;
            println!("Wrote {}", config_path.display());
        }
        ConfigCommand::Show => {
            let mut config = crate::config::load(config_path)?;
            let count = config.tokens.len();
            config.tokens = vec!["<redacted>".to_string(); count];
            print!("{}", config.to_toml_string()?);
            if count == 0 {
                eprintln!("no tokens configured; set {TOKEN_ENV} or run `vkfan config init --token ...`");
            }
        }
        ConfigCommand::Path => println!("{}", config_path.display()),
    }
    Ok(())
}
