pub mod call;
pub mod config;
pub mod friends;
pub mod groups;
pub mod users;
pub mod wall;

use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// users.get, users.getSubscriptions, users.getFollowers
    Users(users::UsersArgs),
    /// groups.getById, groups.isMember, groups.getMembers
    Groups(groups::GroupsArgs),
    /// Friend lists of one or more users
    Friends(friends::FriendsArgs),
    /// Posts on a user or community wall
    Wall(wall::WallArgs),
    /// Any routed method by name
    Call(call::CallArgs),
    /// Create or inspect the config file
    Config(config::ConfigArgs),
}

impl Commands {
    pub async fn run(self, config_path: PathBuf) -> anyhow::Result<()> {
        match self {
            Commands::Users(args) => users::run(args, &config_path).await,
            Commands::Groups(args) => groups::run(args, &config_path).await,
            Commands::Friends(args) => friends::run(args, &config_path).await,
            Commands::Wall(args) => wall::run(args, &config_path).await,
            Commands::Call(args) => call::run(args, &config_path).await,
            Commands::Config(args) => config::run(args, &config_path),
        }
    }
}
