use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use tracing::warn;
use vkfan_core::{QueryBuilder, QueryPath, RequestDescriptor, RequestId};
use vkfan_pool::{Completed, TaskPool};

use crate::handlers::{friends, groups, users, wall};
use crate::{CallOptions, QueryError, SubQuery, SubQueryBuilder};

/// What a handler produced for one response.
#[derive(Debug)]
pub enum HandlerOutput {
    /// Final values for the response's path.
    Items(Value),
    /// Follow-up requests were queued; their results arrive in later waves.
    SubQuery(SubQuery),
}

impl HandlerOutput {
    pub fn empty() -> Self {
        HandlerOutput::Items(Value::Array(Vec::new()))
    }
}

/// Everything a handler may touch while processing one response.
pub struct HandlerContext<'a> {
    path: &'a QueryPath,
    id: RequestId,
    follow_up: bool,
    options: &'a CallOptions,
    builder: &'a QueryBuilder,
    pool: &'a mut TaskPool,
}

impl<'a> HandlerContext<'a> {
    pub fn new(
        path: &'a QueryPath,
        id: RequestId,
        follow_up: bool,
        options: &'a CallOptions,
        builder: &'a QueryBuilder,
        pool: &'a mut TaskPool,
    ) -> Self {
        Self {
            path,
            id,
            follow_up,
            options,
            builder,
            pool,
        }
    }

    pub fn path(&self) -> &QueryPath {
        self.path
    }

    pub fn request_id(&self) -> RequestId {
        self.id
    }

    /// The response answers a request that an open sub-query is waiting on.
    pub fn is_follow_up(&self) -> bool {
        self.follow_up
    }

    pub fn options(&self) -> &CallOptions {
        self.options
    }

    pub fn builder(&self) -> &QueryBuilder {
        self.builder
    }

    /// Queue follow-up requests for the next wave.
    pub fn submit(&mut self, requests: Vec<RequestDescriptor>) -> Result<Vec<RequestId>, QueryError> {
        Ok(self.pool.add(requests)?)
    }

    /// A sub-query over `ids` that pushes into this handler's own path.
    pub fn subquery(&self, ids: Vec<RequestId>) -> SubQueryBuilder {
        SubQuery::builder(ids, self.path.clone())
    }
}

pub type HandlerFn = fn(&mut HandlerContext<'_>, Value) -> Result<HandlerOutput, QueryError>;

/// `{entity}.{submethod}` to handler, filled in by explicit registration.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<QueryPath, HandlerFn>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers for every route in the default route table.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register(QueryPath::new("users", "get"), users::get)
            .register(QueryPath::new("users", "getsubscriptions"), users::get_subscriptions)
            .register(QueryPath::new("users", "getfollowers"), users::get_followers)
            .register(QueryPath::new("groups", "getbyid"), groups::get_by_id)
            .register(QueryPath::new("groups", "ismember"), groups::is_member)
            .register(QueryPath::new("groups", "getmembers"), groups::get_members)
            .register(QueryPath::new("friends", "get"), friends::get)
            .register(QueryPath::new("wall", "get"), wall::get);
        registry
    }

    pub fn register(&mut self, path: QueryPath, handler: HandlerFn) -> &mut Self {
        self.handlers.insert(path, handler);
        self
    }

    pub fn get(&self, path: &QueryPath) -> Option<HandlerFn> {
        self.handlers.get(path).copied()
    }

    pub fn contains(&self, path: &QueryPath) -> bool {
        self.handlers.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &QueryPath> {
        self.handlers.keys()
    }
}

/// The `response` member of a successful envelope.
///
/// Network errors, non-2xx statuses, unparseable bodies and `error` envelopes
/// all yield `None` after a warning.
pub fn response_payload(completed: &Completed) -> Option<Value> {
    let raw = match &completed.outcome {
        Ok(raw) => raw,
        Err(err) => {
            warn!(url = %completed.url, error = %err, "request failed");
            return None;
        }
    };
    if !raw.is_success() {
        warn!(url = %completed.url, status = raw.status, "request returned error status");
        return None;
    }

    let mut body = match raw.json() {
        Ok(body) => body,
        Err(err) => {
            warn!(url = %completed.url, error = %err, "response is not valid JSON");
            return None;
        }
    };
    if let Some(error) = body.get("error") {
        let code = error.get("error_code").and_then(Value::as_i64).unwrap_or_default();
        let msg = error.get("error_msg").and_then(Value::as_str).unwrap_or_default();
        warn!(url = %completed.url, code, msg, "API returned error envelope");
        return None;
    }
    match body.get_mut("response") {
        Some(payload) => Some(payload.take()),
        None => {
            warn!(url = %completed.url, "response envelope has no payload");
            None
        }
    }
}

/// `payload[key]`, or a shape error naming the handler's path.
pub(crate) fn field(ctx: &HandlerContext<'_>, payload: &Value, key: &str) -> Result<Value, QueryError> {
    payload.get(key).cloned().ok_or_else(|| QueryError::Shape {
        path: ctx.path().to_string(),
        detail: format!("missing `{key}`"),
    })
}

/// Identifiers listed in a JSON array of ids, skipping anything non-numeric.
pub(crate) fn idents(items: &Value) -> Vec<vkfan_core::Ident> {
    items
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_i64().or_else(|| item.get("id").and_then(Value::as_i64)))
                .map(vkfan_core::Ident::Id)
                .collect()
        })
        .unwrap_or_default()
}
