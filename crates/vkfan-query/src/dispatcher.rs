use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use vkfan_core::{QueryBuilder, RequestId};
use vkfan_pool::{CompletionHandler, TaskPool, Transport, Wave};

use crate::handler::{response_payload, HandlerContext, HandlerOutput};
use crate::{CallOptions, HandlerRegistry, QueryError, ResultTree, SubQuery};

/// Routes the responses of one logical call to their handlers and drives
/// follow-up waves until nothing is left pending.
///
/// Use it as the completion handler of the call's first wave. Follow-up
/// requests go to the dispatcher's own pool, so the caller's pool only ever
/// sees the first wave.
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    builder: QueryBuilder,
    options: CallOptions,
    pool: TaskPool,
    tree: ResultTree,
    subqueries: Vec<SubQuery>,
    tracked: HashMap<RequestId, usize>,
    waves: usize,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<HandlerRegistry>,
        builder: QueryBuilder,
        options: CallOptions,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let tree = ResultTree::seeded(registry.paths());
        Self {
            registry,
            builder,
            options,
            pool: TaskPool::new(transport),
            tree,
            subqueries: Vec::new(),
            tracked: HashMap::new(),
            waves: 0,
        }
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.pool = self.pool.with_max_concurrency(max);
        self
    }

    pub fn tree(&self) -> &ResultTree {
        &self.tree
    }

    /// Waves processed so far, the first one included.
    pub fn waves(&self) -> usize {
        self.waves
    }

    pub fn subqueries(&self) -> &[SubQuery] {
        &self.subqueries
    }

    /// Process `first`, then every follow-up wave it spawns, and return the finished tree.
    pub async fn resolve(&mut self, first: &Wave) -> Result<ResultTree, QueryError> {
        self.process(first)?;
        while let Some(wave) = self.pool.run_wave().await? {
            self.process(&wave)?;
        }
        debug!(waves = self.waves, subqueries = self.subqueries.len(), "call resolved");
        Ok(std::mem::take(&mut self.tree))
    }

    /// Route every response of `wave`, register new sub-queries, and push the
    /// sub-queries once all of them are complete.
    pub fn process(&mut self, wave: &Wave) -> Result<(), QueryError> {
        self.waves += 1;
        debug!(wave = self.waves, responses = wave.len(), "processing wave");

        let mut spawned = Vec::new();
        for completed in &wave.results {
            let Some(path) = self.builder.routes().resolve(&completed.url) else {
                warn!(url = %completed.url, "no route matches response, dropping it");
                continue;
            };
            let Some(handler) = self.registry.get(&path) else {
                warn!(%path, "no handler registered, dropping response");
                continue;
            };
            let tracked = self.tracked.get(&completed.id).copied();

            let output = match response_payload(completed) {
                Some(payload) => {
                    let mut ctx = HandlerContext::new(
                        &path,
                        completed.id,
                        tracked.is_some(),
                        &self.options,
                        &self.builder,
                        &mut self.pool,
                    );
                    match handler(&mut ctx, payload) {
                        Ok(output) => output,
                        Err(QueryError::Shape { path, detail }) => {
                            warn!(%path, %detail, "unexpected payload, treating as empty");
                            HandlerOutput::empty()
                        }
                        Err(err) => return Err(err),
                    }
                }
                None => HandlerOutput::empty(),
            };

            match (output, tracked) {
                (HandlerOutput::Items(value), Some(index)) => {
                    self.subqueries[index].update(completed.id, value);
                }
                (HandlerOutput::Items(value), None) => self.tree.extend(&path, value),
                (HandlerOutput::SubQuery(subquery), tracked) => {
                    if let Some(index) = tracked {
                        self.subqueries[index].update(completed.id, Value::Array(Vec::new()));
                    }
                    spawned.push(subquery);
                }
            }
        }

        for subquery in spawned {
            self.register(subquery);
        }

        if !self.subqueries.is_empty() && self.subqueries.iter().all(SubQuery::is_complete) {
            for subquery in &mut self.subqueries {
                if subquery.push(&mut self.tree) {
                    debug!(path = %subquery.path(), "sub-query pushed");
                }
            }
        }
        Ok(())
    }

    /// Track `subquery`. One that targets the same path as an open sub-query
    /// is folded into it, so both lists land in the tree.
    fn register(&mut self, subquery: SubQuery) {
        let open = self
            .subqueries
            .iter()
            .position(|sq| !sq.is_pushed() && sq.path() == subquery.path());
        let index = open.unwrap_or(self.subqueries.len());
        for id in subquery.ids() {
            self.tracked.insert(*id, index);
        }

        match open {
            Some(index) => {
                debug!(path = %subquery.path(), pending = subquery.pending(), "sub-query folded into open one");
                self.subqueries[index].absorb(subquery);
            }
            None => {
                debug!(path = %subquery.path(), pending = subquery.pending(), "sub-query registered");
                self.subqueries.push(subquery);
            }
        }
    }
}

#[async_trait]
impl CompletionHandler for Dispatcher {
    type Output = Result<ResultTree, QueryError>;

    async fn on_complete(&mut self, wave: &Wave) -> Self::Output {
        self.resolve(wave).await
    }
}
