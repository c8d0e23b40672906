use std::path::Path;

use clap::Args;
use vkfan::{FriendsGet, Ident, VkClient};

use crate::output::OutputArgs;

#[derive(Args)]
pub struct FriendsArgs {
    /// Users whose friend lists to fetch
    #[arg(required = true)]
    users: Vec<Ident>,
    /// Return friend profiles instead of ids
    #[arg(long)]
    data: bool,
    #[command(flatten)]
    output: OutputArgs,
}

pub async fn run(args: FriendsArgs, config_path: &Path) -> anyhow::Result<()> {
    let config = crate::config::load(config_path)?;
    let client = VkClient::new(&config)?;
    let params = FriendsGet {
        user_ids: args.users,
        data_friends: args.data,
    };
    let friends = client.friends().get(params).await?;
    args.output.emit_items(&config, friends)
}
