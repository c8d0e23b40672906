use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vkfan_core::{CoreError, Ident, Params, QueryPath};

/// How many items a paginated call should fetch in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Limit {
    /// Whatever `count` the first page reports.
    #[default]
    All,
    Count(usize),
}

impl Limit {
    /// Absolute offset to stop at, given the total the API reported.
    pub fn end(self, reported: usize) -> usize {
        match self {
            Limit::All => reported,
            Limit::Count(n) => n.min(reported),
        }
    }
}

impl FromStr for Limit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Limit::All);
        }
        s.parse()
            .map(Limit::Count)
            .map_err(|_| CoreError::InvalidParams(format!("max must be \"all\" or a number, got {s:?}")))
    }
}

/// Paging parameters for one paginated route in a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec {
    pub owner: Ident,
    /// Multi-id parameter the owner is sent under, e.g. `group_ids`.
    pub param: String,
    pub count: usize,
    pub offset: usize,
    pub max: Limit,
    pub params: Params,
}

impl PageSpec {
    pub fn new(owner: Ident, param: impl Into<String>, count: usize) -> Self {
        Self {
            owner,
            param: param.into(),
            count,
            offset: 0,
            max: Limit::All,
            params: Params::new(),
        }
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn max(mut self, max: Limit) -> Self {
        self.max = max;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Parameters of the first page request.
    pub fn first_page_params(&self) -> Params {
        let mut params = self.params.clone();
        params.insert("offset".to_string(), self.offset.to_string());
        params.insert("count".to_string(), self.count.to_string());
        params
    }
}

/// Per-call switches read by the handlers.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub data_friends: bool,
    pub data_subscriptions: bool,
    pub data_followers: bool,
    pub pages: BTreeMap<QueryPath, PageSpec>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data_friends(mut self, on: bool) -> Self {
        self.data_friends = on;
        self
    }

    pub fn data_subscriptions(mut self, on: bool) -> Self {
        self.data_subscriptions = on;
        self
    }

    pub fn data_followers(mut self, on: bool) -> Self {
        self.data_followers = on;
        self
    }

    pub fn page(mut self, path: QueryPath, spec: PageSpec) -> Self {
        self.pages.insert(path, spec);
        self
    }

    /// Fold another call's options into this one, for calls sharing a wave.
    pub fn merge(&mut self, other: CallOptions) {
        self.data_friends |= other.data_friends;
        self.data_subscriptions |= other.data_subscriptions;
        self.data_followers |= other.data_followers;
        self.pages.extend(other.pages);
    }
}
