use std::path::Path;

use clap::Args;
use vkfan::{Ident, Limit, VkClient, WallGet};

use crate::output::OutputArgs;

#[derive(Args)]
pub struct WallArgs {
    /// Wall owner; negative ids are communities
    #[arg(allow_hyphen_values = true)]
    owner: Ident,
    /// Page size, at most 100
    #[arg(long, default_value_t = 100)]
    count: usize,
    #[arg(long, default_value_t = 0)]
    offset: usize,
    /// Stop after this many posts, or "all"
    #[arg(long, default_value = "all")]
    max: Limit,
    #[command(flatten)]
    output: OutputArgs,
}

pub async fn run(args: WallArgs, config_path: &Path) -> anyhow::Result<()> {
    let config = crate::config::load(config_path)?;
    let client = VkClient::new(&config)?;
    let params = WallGet {
        owner_id: args.owner,
        count: args.count,
        offset: args.offset,
        max: args.max,
    };
    let posts = client.wall().get(params).await?;
    args.output.emit_items(&config, posts)
}
