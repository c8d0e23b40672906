use std::path::Path;

use clap::{Args, Subcommand};
use vkfan::{Ident, UsersGet, VkClient};

use crate::output::OutputArgs;

#[derive(Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    command: UsersCommand,
}

#[derive(Subcommand)]
enum UsersCommand {
    /// Profiles of one or more users
    Get {
        /// User ids or screen names
        #[arg(required = true)]
        ids: Vec<Ident>,
        /// Also fetch the friend list (single user only)
        #[arg(long)]
        friends: bool,
        /// Also fetch subscriptions (single user only)
        #[arg(long)]
        subscriptions: bool,
        /// Also fetch followers (single user only)
        #[arg(long)]
        followers: bool,
        /// Also fetch the first wall page (single user only)
        #[arg(long)]
        wall: bool,
        /// Expand friend ids into profiles
        #[arg(long)]
        data_friends: bool,
        /// Expand subscriptions into profiles
        #[arg(long)]
        data_subscriptions: bool,
        /// Expand follower ids into profiles
        #[arg(long)]
        data_followers: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Users and communities a user follows
    Subscriptions {
        user: Ident,
        /// Return full profiles instead of ids
        #[arg(long)]
        data: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// A user's followers
    Followers {
        user: Ident,
        /// Return full profiles instead of ids
        #[arg(long)]
        data: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
}

pub async fn run(args: UsersArgs, config_path: &Path) -> anyhow::Result<()> {
    let config = crate::config::load(config_path)?;
    let client = VkClient::new(&config)?;
    let users = client.users();

    match args.command {
        UsersCommand::Get {
            ids,
            friends,
            subscriptions,
            followers,
            wall,
            data_friends,
            data_subscriptions,
            data_followers,
            output,
        } => {
            let params = UsersGet {
                user_ids: ids,
                friends,
                subscriptions,
                followers,
                wall,
                data_friends,
                data_subscriptions,
                data_followers,
            };
            let profiles = users.get(params).await?;
            if let Some(table) = &output.save {
                output.save_items(&config, table, &profiles.users)?;
            }
            output.print(&serde_json::to_value(&profiles)?)?;
        }
        UsersCommand::Subscriptions { user, data, output } => {
            let items = users.get_subscriptions(&user, data).await?;
            output.emit_items(&config, items)?;
        }
        UsersCommand::Followers { user, data, output } => {
            let items = users.get_followers(&user, data).await?;
            output.emit_items(&config, items)?;
        }
    }
    Ok(())
}
