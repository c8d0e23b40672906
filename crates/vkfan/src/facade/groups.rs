use serde::{Deserialize, Serialize};
use serde_json::Value;
use vkfan_core::{Ident, QueryPath};
use vkfan_query::{requests, CallOptions, Limit, PageSpec};

use crate::{ClientError, PreparedCall, VkClient};

/// Largest page `groups.getMembers` serves.
pub(crate) const MEMBERS_PAGE: usize = 1000;

/// Parameters of [`Groups::get_members`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembers {
    pub group_id: Ident,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default)]
    pub max: Limit,
}

fn default_count() -> usize {
    MEMBERS_PAGE
}

fn default_sort() -> String {
    "id_asc".to_string()
}

impl GroupMembers {
    pub fn new(group_id: impl Into<Ident>) -> Self {
        Self {
            group_id: group_id.into(),
            count: default_count(),
            offset: 0,
            sort: default_sort(),
            max: Limit::All,
        }
    }

    fn page_spec(&self) -> Result<PageSpec, ClientError> {
        if self.count == 0 || self.count > MEMBERS_PAGE {
            return Err(ClientError::invalid(format!(
                "count must be between 1 and {MEMBERS_PAGE}, got {}",
                self.count
            )));
        }
        Ok(PageSpec::new(self.group_id.clone(), "group_ids", self.count)
            .offset(self.offset)
            .max(self.max)
            .param("sort", self.sort.clone()))
    }
}

pub struct Groups<'a> {
    client: &'a VkClient,
}

impl<'a> Groups<'a> {
    pub(crate) fn new(client: &'a VkClient) -> Self {
        Self { client }
    }

    pub async fn get_by_id(&self, group_ids: &[Ident]) -> Result<Vec<Value>, ClientError> {
        let call = self.get_by_id_requests(group_ids)?;
        let mut tree = self.client.execute(call).await?;
        Ok(tree.take(&QueryPath::new("groups", "getbyid")))
    }

    pub fn get_by_id_requests(&self, group_ids: &[Ident]) -> Result<PreparedCall, ClientError> {
        Ok(PreparedCall::new(
            requests::groups_get_by_id(self.client.builder(), group_ids)?,
            CallOptions::new(),
        ))
    }

    /// Membership of each user in `group_id`, in response order.
    pub async fn is_member(&self, group_id: &Ident, user_ids: &[Ident]) -> Result<Vec<Value>, ClientError> {
        let call = self.is_member_requests(group_id, user_ids)?;
        let mut tree = self.client.execute(call).await?;
        Ok(tree.take(&QueryPath::new("groups", "ismember")))
    }

    pub fn is_member_requests(
        &self,
        group_id: &Ident,
        user_ids: &[Ident],
    ) -> Result<PreparedCall, ClientError> {
        Ok(PreparedCall::new(
            requests::groups_is_member(self.client.builder(), group_id, user_ids)?,
            CallOptions::new(),
        ))
    }

    /// Member ids, fetched page by page up to `params.max`.
    pub async fn get_members(&self, params: GroupMembers) -> Result<Vec<Value>, ClientError> {
        let call = self.get_members_requests(&params)?;
        let mut tree = self.client.execute(call).await?;
        Ok(tree.take(&QueryPath::new("groups", "getmembers")))
    }

    pub fn get_members_requests(&self, params: &GroupMembers) -> Result<PreparedCall, ClientError> {
        let path = QueryPath::new("groups", "getmembers");
        let spec = params.page_spec()?;
        let requests = requests::first_page(self.client.builder(), &path, &spec)?;
        Ok(PreparedCall::new(requests, CallOptions::new().page(path, spec)))
    }
}
