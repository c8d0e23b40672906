use serde::{Deserialize, Serialize};
use serde_json::Value;
use vkfan_core::{Ident, QueryPath};
use vkfan_query::{requests, CallOptions, PageSpec};

use super::wall::WALL_PAGE;
use crate::{ClientError, PreparedCall, VkClient};

/// Parameters of [`Users::get`].
///
/// `friends`, `subscriptions`, `followers` and `wall` fetch extra data for a
/// single user; each `data_*` flag additionally expands ids into profiles and
/// needs its base flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsersGet {
    pub user_ids: Vec<Ident>,
    pub friends: bool,
    pub subscriptions: bool,
    pub followers: bool,
    pub wall: bool,
    pub data_friends: bool,
    pub data_subscriptions: bool,
    pub data_followers: bool,
}

impl UsersGet {
    pub fn ids(ids: impl IntoIterator<Item = impl Into<Ident>>) -> Self {
        Self {
            user_ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), ClientError> {
        let extras = [
            ("friends", self.friends),
            ("subscriptions", self.subscriptions),
            ("followers", self.followers),
            ("wall", self.wall),
        ];
        if let Some((name, _)) = extras.iter().find(|(_, on)| *on) {
            if self.user_ids.len() != 1 {
                return Err(ClientError::invalid(format!(
                    "`{name}` needs exactly one user id, got {}",
                    self.user_ids.len()
                )));
            }
        }

        let data = [
            ("data_friends", self.data_friends, "friends", self.friends),
            ("data_subscriptions", self.data_subscriptions, "subscriptions", self.subscriptions),
            ("data_followers", self.data_followers, "followers", self.followers),
        ];
        for (flag, on, base, base_on) in data {
            if on && !base_on {
                return Err(ClientError::invalid(format!("`{flag}` needs `{base}`")));
            }
        }
        Ok(())
    }
}

/// Everything [`Users::get`] collected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfiles {
    pub users: Vec<Value>,
    pub friends: Vec<Value>,
    pub subscriptions: Vec<Value>,
    pub followers: Vec<Value>,
    pub wall: Vec<Value>,
}

pub struct Users<'a> {
    client: &'a VkClient,
}

impl<'a> Users<'a> {
    pub(crate) fn new(client: &'a VkClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, params: UsersGet) -> Result<UserProfiles, ClientError> {
        let call = self.get_requests(&params)?;
        let mut tree = self.client.execute(call).await?;
        Ok(UserProfiles {
            users: tree.take(&QueryPath::new("users", "get")),
            friends: tree.take(&QueryPath::new("friends", "get")),
            subscriptions: tree.take(&QueryPath::new("users", "getsubscriptions")),
            followers: tree.take(&QueryPath::new("users", "getfollowers")),
            wall: tree.take(&QueryPath::new("wall", "get")),
        })
    }

    pub fn get_requests(&self, params: &UsersGet) -> Result<PreparedCall, ClientError> {
        params.validate()?;
        let builder = self.client.builder();
        let mut call = PreparedCall::new(
            requests::users_get(builder, &params.user_ids)?,
            CallOptions::new()
                .data_friends(params.data_friends)
                .data_subscriptions(params.data_subscriptions)
                .data_followers(params.data_followers),
        );

        let Some(user) = params.user_ids.first() else {
            return Ok(call);
        };
        if params.subscriptions {
            call.join(self.get_subscriptions_requests(user, params.data_subscriptions)?);
        }
        if params.followers {
            call.join(self.get_followers_requests(user, params.data_followers)?);
        }
        if params.friends {
            call.requests
                .extend(requests::friends_get(builder, std::slice::from_ref(user))?);
        }
        if params.wall {
            let path = QueryPath::new("wall", "get");
            let spec = PageSpec::new(user.clone(), "owner_ids", WALL_PAGE);
            call.requests
                .extend(requests::first_page(builder, &path, &spec)?);
            call.options.pages.insert(path, spec);
        }
        Ok(call)
    }

    /// Groups and users `user_id` follows. With `data` the result is one
    /// object `{"users": [...], "groups": [...]}` of full profiles.
    pub async fn get_subscriptions(&self, user_id: &Ident, data: bool) -> Result<Vec<Value>, ClientError> {
        let call = self.get_subscriptions_requests(user_id, data)?;
        let mut tree = self.client.execute(call).await?;
        Ok(tree.take(&QueryPath::new("users", "getsubscriptions")))
    }

    pub fn get_subscriptions_requests(
        &self,
        user_id: &Ident,
        data: bool,
    ) -> Result<PreparedCall, ClientError> {
        Ok(PreparedCall::new(
            requests::users_connections(self.client.builder(), "getSubscriptions", user_id)?,
            CallOptions::new().data_subscriptions(data),
        ))
    }

    /// Followers of `user_id`; with `data`, their profiles.
    pub async fn get_followers(&self, user_id: &Ident, data: bool) -> Result<Vec<Value>, ClientError> {
        let call = self.get_followers_requests(user_id, data)?;
        let mut tree = self.client.execute(call).await?;
        Ok(tree.take(&QueryPath::new("users", "getfollowers")))
    }

    pub fn get_followers_requests(&self, user_id: &Ident, data: bool) -> Result<PreparedCall, ClientError> {
        Ok(PreparedCall::new(
            requests::users_connections(self.client.builder(), "getFollowers", user_id)?,
            CallOptions::new().data_followers(data),
        ))
    }
}
