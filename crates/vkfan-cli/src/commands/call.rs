use std::path::Path;

use clap::Args;
use vkfan::{Ident, Params, VkClient};

use crate::output::OutputArgs;

#[derive(Args)]
pub struct CallArgs {
    /// API section, e.g. `groups`
    entity: String,
    /// Method within the section, e.g. `getMembers`
    submethod: String,
    /// Ids the method is called for
    #[arg(allow_hyphen_values = true)]
    ids: Vec<Ident>,
    /// Extra request parameter, repeatable
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,
    #[command(flatten)]
    output: OutputArgs,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

pub async fn run(args: CallArgs, config_path: &Path) -> anyhow::Result<()> {
    let config = crate::config::load(config_path)?;
    let client = VkClient::new(&config)?;
    let params: Params = args.params.into_iter().collect();
    let tree = client
        .call(&args.entity, &args.submethod, &args.ids, &params)
        .await?;
    args.output.emit_tree(&config, &tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_split_on_first_equals() {
        assert_eq!(
            parse_param("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }
}
