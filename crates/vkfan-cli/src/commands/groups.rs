use std::path::Path;

use clap::{Args, Subcommand};
use vkfan::{GroupMembers, Ident, Limit, VkClient};

use crate::output::OutputArgs;

#[derive(Args)]
pub struct GroupsArgs {
    #[command(subcommand)]
    command: GroupsCommand,
}

#[derive(Subcommand)]
enum GroupsCommand {
    /// Community profiles
    #[command(name = "get-by-id")]
    GetById {
        #[arg(required = true)]
        ids: Vec<Ident>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Whether users belong to a community
    #[command(name = "is-member")]
    IsMember {
        group: Ident,
        #[arg(required = true)]
        users: Vec<Ident>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Member ids of a community, all pages
    Members {
        group: Ident,
        /// Page size, at most 1000
        #[arg(long, default_value_t = 1000)]
        count: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value = "id_asc")]
        sort: String,
        /// Stop after this many members, or "all"
        #[arg(long, default_value = "all")]
        max: Limit,
        #[command(flatten)]
        output: OutputArgs,
    },
}

pub async fn run(args: GroupsArgs, config_path: &Path) -> anyhow::Result<()> {
    let config = crate::config::load(config_path)?;
    let client = VkClient::new(&config)?;
    let groups = client.groups();

    match args.command {
        GroupsCommand::GetById { ids, output } => {
            output.emit_items(&config, groups.get_by_id(&ids).await?)?;
        }
        GroupsCommand::IsMember {
            group,
            users,
            output,
        } => {
            output.emit_items(&config, groups.is_member(&group, &users).await?)?;
        }
        GroupsCommand::Members {
            group,
            count,
            offset,
            sort,
            max,
            output,
        } => {
            let params = GroupMembers {
                group_id: group,
                count,
                offset,
                sort,
                max,
            };
            output.emit_items(&config, groups.get_members(params).await?)?;
        }
    }
    Ok(())
}
