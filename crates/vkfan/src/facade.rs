//! One façade per API section. Every call has a `*_requests` twin that
//! returns a [`PreparedCall`](crate::PreparedCall) instead of running it.

mod friends;
mod groups;
mod users;
mod wall;

pub use friends::{Friends, FriendsGet};
pub use groups::{GroupMembers, Groups};
pub use users::{UserProfiles, Users, UsersGet};
pub use wall::{Wall, WallGet};

/// A façade picked by section name at runtime.
pub enum Facade<'a> {
    Users(Users<'a>),
    Groups(Groups<'a>),
    Friends(Friends<'a>),
    Wall(Wall<'a>),
}

impl Facade<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Facade::Users(_) => "users",
            Facade::Groups(_) => "groups",
            Facade::Friends(_) => "friends",
            Facade::Wall(_) => "wall",
        }
    }
}
