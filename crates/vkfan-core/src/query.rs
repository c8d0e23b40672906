use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::batch::{batch_ids, IdBatch};
use crate::{
    CoreError, CredentialPool, HttpMethod, Ident, QueryPath, RequestDescriptor, RouteTable,
    TransportKind,
};

pub type Params = BTreeMap<String, String>;

pub const DEFAULT_API_VERSION: &str = "5.132";

/// Parameters and headers every request carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseParams {
    pub version: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for BaseParams {
    fn default() -> Self {
        Self {
            version: DEFAULT_API_VERSION.to_string(),
            headers: BTreeMap::new(),
        }
    }
}

/// Offsets `start, start + step, ...` below `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
    pub step: usize,
}

impl PageRange {
    pub fn offsets(&self) -> impl Iterator<Item = usize> {
        let step = self.step;
        let end = if step == 0 { self.start } else { self.end };
        (self.start..end).step_by(step.max(1))
    }
}

/// `user_ids` -> `user_id`. Names without the plural suffix are returned as-is.
pub fn singular_param(name: &str) -> String {
    match name.strip_suffix("ids") {
        Some(stem) => format!("{stem}id"),
        None => name.to_string(),
    }
}

/// Turns identifier lists into request descriptors using the route table.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    routes: Arc<RouteTable>,
    credentials: Arc<CredentialPool>,
    base: BaseParams,
    kind: TransportKind,
    timeout: Option<Duration>,
}

impl QueryBuilder {
    pub fn new(routes: Arc<RouteTable>, credentials: Arc<CredentialPool>, base: BaseParams) -> Self {
        Self {
            routes,
            credentials,
            base,
            kind: TransportKind::default(),
            timeout: None,
        }
    }

    pub fn with_kind(mut self, kind: TransportKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    /// Build the requests for `ids` against `path`.
    ///
    /// `param` picks the multi-id parameter; `None` uses the section's first one.
    /// Unknown sections, sub-methods, and parameters fail before anything is built.
    pub fn build(
        &self,
        path: &QueryPath,
        ids: &[Ident],
        param: Option<&str>,
        params: &Params,
    ) -> Result<Vec<RequestDescriptor>, CoreError> {
        let route = self.routes.get(path.entity())?;
        let url = route.endpoint(path.submethod())?;
        let param = match param {
            Some(p) => p,
            None => route.default_param()?,
        };
        let limit = route.limit(param)?;
        Ok(self.from_batch(&url, param, batch_ids(ids, limit), params))
    }

    /// One request per offset of `pages`, each otherwise identical to [`build`](Self::build).
    pub fn paginate(
        &self,
        path: &QueryPath,
        ids: &[Ident],
        param: Option<&str>,
        params: &Params,
        pages: PageRange,
    ) -> Result<Vec<RequestDescriptor>, CoreError> {
        let mut requests = Vec::new();
        for offset in pages.offsets() {
            let mut page = params.clone();
            page.insert("offset".to_string(), offset.to_string());
            page.insert("count".to_string(), pages.step.to_string());
            requests.extend(self.build(path, ids, param, &page)?);
        }
        Ok(requests)
    }

    pub fn from_batch(
        &self,
        url: &str,
        param: &str,
        batch: IdBatch,
        params: &Params,
    ) -> Vec<RequestDescriptor> {
        match batch {
            IdBatch::Single(ids) => match ids.first() {
                Some(id) => vec![self
                    .request(HttpMethod::Get, url, params)
                    .param(singular_param(param), id.to_string())],
                None => Vec::new(),
            },
            IdBatch::Multi { groups, .. } => groups
                .into_iter()
                .map(|group| self.request(HttpMethod::Post, url, params).param(param, group))
                .collect(),
        }
    }

    fn request(&self, method: HttpMethod, url: &str, params: &Params) -> RequestDescriptor {
        let mut req = RequestDescriptor::new(self.kind, method, url)
            .params(params)
            .param("v", self.base.version.clone())
            .credential(self.credentials.take())
            .timeout(self.timeout);
        for (k, v) in &self.base.headers {
            req = req.header(k.clone(), v.clone());
        }
        req
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> QueryBuilder {
        QueryBuilder::new(
            Arc::new(RouteTable::default()),
            Arc::new(CredentialPool::new(["t1", "t2"]).unwrap()),
            BaseParams::default(),
        )
    }

    fn ids(n: i64) -> Vec<Ident> {
        (1..=n).map(Ident::Id).collect()
    }

    #[test]
    fn singular_transform() {
        assert_eq!(singular_param("user_ids"), "user_id");
        assert_eq!(singular_param("owner_ids"), "owner_id");
        assert_eq!(singular_param("fields"), "fields");
    }

    #[test]
    fn no_ids_no_requests() {
        let reqs = builder()
            .build(&QueryPath::new("users", "get"), &[], None, &Params::new())
            .unwrap();
        assert!(reqs.is_empty());
    }

    #[test]
    fn single_id_uses_singular_get() {
        let reqs = builder()
            .build(&QueryPath::new("users", "get"), &ids(1), None, &Params::new())
            .unwrap();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].method, HttpMethod::Get);
        assert_eq!(reqs[0].params.get("user_id").map(String::as_str), Some("1"));
        assert!(!reqs[0].params.contains_key("user_ids"));
        assert_eq!(reqs[0].params.get("v").map(String::as_str), Some(DEFAULT_API_VERSION));
        assert!(reqs[0].credential.is_some());
    }

    #[test]
    fn three_users_is_one_post() {
        let reqs = builder()
            .build(&QueryPath::new("users", "get"), &ids(3), None, &Params::new())
            .unwrap();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].method, HttpMethod::Post);
        assert_eq!(reqs[0].params["user_ids"], "1, 2, 3");
        assert_eq!(reqs[0].url, "https://api.vk.com/method/users.get");
    }

    #[test]
    fn oversized_set_is_split() {
        let reqs = builder()
            .build(&QueryPath::new("groups", "getbyid"), &ids(1200), None, &Params::new())
            .unwrap();
        assert_eq!(reqs.len(), 3);
        assert!(reqs.iter().all(|r| r.credential.is_some()));
    }

    #[test]
    fn explicit_param_must_be_declared() {
        let err = builder()
            .build(&QueryPath::new("wall", "get"), &ids(2), Some("group_ids"), &Params::new())
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownParameter { .. }));
    }

    #[test]
    fn unknown_route_fails_fast() {
        let err = builder()
            .build(&QueryPath::new("users", "ban"), &ids(1), None, &Params::new())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidRoute(_)));
    }

    #[test]
    fn paginate_offsets() {
        let pages = PageRange {
            start: 1000,
            end: 2500,
            step: 1000,
        };
        let reqs = builder()
            .paginate(
                &QueryPath::new("groups", "getmembers"),
                &[Ident::Id(7)],
                Some("group_ids"),
                &Params::new(),
                pages,
            )
            .unwrap();
        let offsets: Vec<&str> = reqs.iter().map(|r| r.params["offset"].as_str()).collect();
        assert_eq!(offsets, vec!["1000", "2000"]);
        assert!(reqs.iter().all(|r| r.params["group_id"] == "7"));
    }

    #[test]
    fn zero_step_yields_nothing() {
        let pages = PageRange {
            start: 0,
            end: 10,
            step: 0,
        };
        assert_eq!(pages.offsets().count(), 0);
    }
}
