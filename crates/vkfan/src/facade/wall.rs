use serde::{Deserialize, Serialize};
use serde_json::Value;
use vkfan_core::{Ident, QueryPath};
use vkfan_query::{requests, CallOptions, Limit, PageSpec};

use crate::{ClientError, PreparedCall, VkClient};

/// Largest page `wall.get` serves.
pub(crate) const WALL_PAGE: usize = 100;

/// Parameters of [`Wall::get`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallGet {
    pub owner_id: Ident,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub max: Limit,
}

fn default_count() -> usize {
    WALL_PAGE
}

impl WallGet {
    pub fn new(owner_id: impl Into<Ident>) -> Self {
        Self {
            owner_id: owner_id.into(),
            count: WALL_PAGE,
            offset: 0,
            max: Limit::All,
        }
    }
}

pub struct Wall<'a> {
    client: &'a VkClient,
}

impl<'a> Wall<'a> {
    pub(crate) fn new(client: &'a VkClient) -> Self {
        Self { client }
    }

    /// Posts on `owner_id`'s wall; negative ids address communities.
    pub async fn get(&self, params: WallGet) -> Result<Vec<Value>, ClientError> {
        let call = self.get_requests(&params)?;
        let mut tree = self.client.execute(call).await?;
        Ok(tree.take(&QueryPath::new("wall", "get")))
    }

    pub fn get_requests(&self, params: &WallGet) -> Result<PreparedCall, ClientError> {
        if params.count == 0 || params.count > WALL_PAGE {
            return Err(ClientError::invalid(format!(
                "count must be between 1 and {WALL_PAGE}, got {}",
                params.count
            )));
        }
        let path = QueryPath::new("wall", "get");
        let spec = PageSpec::new(params.owner_id.clone(), "owner_ids", params.count)
            .offset(params.offset)
            .max(params.max);
        let requests = requests::first_page(self.client.builder(), &path, &spec)?;
        Ok(PreparedCall::new(requests, CallOptions::new().page(path, spec)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ClientConfig;
    use serde_json::json;
    use vkfan_pool::testing::ScriptedTransport;
    use vkfan_pool::RawResponse;

    #[tokio::test]
    async fn posts_are_paged_from_offset() {
        let transport = Arc::new(ScriptedTransport::new(|req| {
            let offset: usize = req.params["offset"].parse().unwrap();
            let end = (offset + 100).min(250);
            let items: Vec<Value> = (offset..end).map(|i| json!({"id": i})).collect();
            let body = json!({"response": {"count": 250, "items": items}});
            Ok(RawResponse::new(200, body.to_string()))
        }));
        let client =
            VkClient::with_transport(&ClientConfig::with_tokens(["t"]), transport.clone()).unwrap();
        let params = WallGet {
            offset: 50,
            ..WallGet::new(-1i64)
        };
        let posts = client.wall().get(params).await.unwrap();
        // offsets 50, 150; 250 is past the reported count
        assert_eq!(transport.sent_count(), 2);
        assert_eq!(posts.len(), 200);
        assert!(transport.sent().iter().all(|r| r.params["owner_id"] == "-1"));
    }

    #[test]
    fn zero_count_is_rejected() {
        let transport = Arc::new(ScriptedTransport::ok_json(json!([])));
        let client = VkClient::with_transport(&ClientConfig::with_tokens(["t"]), transport).unwrap();
        let params = WallGet {
            count: 0,
            ..WallGet::new(1i64)
        };
        assert!(client.wall().get_requests(&params).is_err());
    }
}
