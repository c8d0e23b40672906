use serde::{Deserialize, Serialize};
use serde_json::Value;
use vkfan_core::{Ident, QueryPath};
use vkfan_query::{requests, CallOptions};

use crate::{ClientError, PreparedCall, VkClient};

/// Parameters of [`Friends::get`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FriendsGet {
    pub user_ids: Vec<Ident>,
    /// Replace friend ids with full profiles.
    pub data_friends: bool,
}

impl FriendsGet {
    pub fn of(user_id: impl Into<Ident>) -> Self {
        Self {
            user_ids: vec![user_id.into()],
            data_friends: false,
        }
    }
}

pub struct Friends<'a> {
    client: &'a VkClient,
}

impl<'a> Friends<'a> {
    pub(crate) fn new(client: &'a VkClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, params: FriendsGet) -> Result<Vec<Value>, ClientError> {
        let call = self.get_requests(&params)?;
        let mut tree = self.client.execute(call).await?;
        Ok(tree.take(&QueryPath::new("friends", "get")))
    }

    pub fn get_requests(&self, params: &FriendsGet) -> Result<PreparedCall, ClientError> {
        Ok(PreparedCall::new(
            requests::friends_get(self.client.builder(), &params.user_ids)?,
            CallOptions::new().data_friends(params.data_friends),
        ))
    }
}
