use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::debug;
use vkfan_core::{RequestDescriptor, RequestId, TransportKind};

use crate::transport::{Completed, Transport};
use crate::PoolError;

pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Lifecycle of a [`TaskPool`]. Ordered so that merging can take the lower state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PoolState {
    Empty,
    Waiting,
    Executing,
    Completed,
}

/// Results of one executed batch, in the order the transport reported them.
#[derive(Debug, Default)]
pub struct Wave {
    pub results: Vec<Completed>,
}

impl Wave {
    /// Request ids parallel to `results`.
    pub fn ids(&self) -> Vec<RequestId> {
        self.results.iter().map(|c| c.id).collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Called once per executed wave by [`TaskPool::start`].
#[async_trait]
pub trait CompletionHandler: Send {
    type Output: Send + 'static;

    async fn on_complete(&mut self, wave: &Wave) -> Self::Output;
}

/// Pending requests of one transport kind, executed together on `start`.
pub struct TaskPool<T = ()> {
    transport: Arc<dyn Transport>,
    max_concurrency: usize,
    tasks: Vec<RequestDescriptor>,
    ids: Vec<RequestId>,
    kind: Option<TransportKind>,
    state: PoolState,
    results: Vec<Completed>,
    callable_results: Vec<T>,
}

impl<T> TaskPool<T> {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            tasks: Vec::new(),
            ids: Vec::new(),
            kind: None,
            state: PoolState::Empty,
            results: Vec::new(),
            callable_results: Vec::new(),
        }
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    pub fn state(&self) -> PoolState {
        self.state
    }

    pub fn is_waiting(&self) -> bool {
        self.state == PoolState::Waiting
    }

    pub fn kind(&self) -> Option<TransportKind> {
        self.kind
    }

    pub fn tasks(&self) -> &[RequestDescriptor] {
        &self.tasks
    }

    pub fn ids(&self) -> &[RequestId] {
        &self.ids
    }

    /// Raw results of the most recent wave.
    pub fn results(&self) -> &[Completed] {
        &self.results
    }

    /// One entry per completed `start`, oldest first.
    pub fn callable_results(&self) -> &[T] {
        &self.callable_results
    }

    pub fn last_result(&self) -> Option<&T> {
        self.callable_results.last()
    }

    pub fn take_last_result(&mut self) -> Option<T> {
        self.callable_results.pop()
    }

    /// Queue `tasks` and return their ids, in order.
    ///
    /// All tasks must share one transport kind, and it must match whatever is
    /// already pending. On mismatch nothing is added.
    pub fn add(&mut self, tasks: Vec<RequestDescriptor>) -> Result<Vec<RequestId>, PoolError> {
        let Some(first) = tasks.first() else {
            return Ok(Vec::new());
        };

        let expected = self.kind.unwrap_or(first.kind);
        if let Some(bad) = tasks.iter().find(|t| t.kind != expected) {
            return Err(PoolError::TypeKindMismatch {
                expected,
                found: bad.kind,
            });
        }

        if self.state == PoolState::Completed {
            self.results.clear();
        }

        let ids: Vec<RequestId> = tasks.iter().map(|_| RequestId::new()).collect();
        self.kind = Some(expected);
        self.tasks.extend(tasks);
        self.ids.extend_from_slice(&ids);
        self.state = PoolState::Waiting;
        Ok(ids)
    }

    /// Drop pending tasks and forget the transport kind.
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.ids.clear();
        self.kind = None;
        if self.state == PoolState::Waiting {
            self.state = PoolState::Empty;
        }
    }

    /// [`clear`](Self::clear) plus the raw and callable results.
    pub fn clear_all(&mut self) {
        self.clear();
        self.results.clear();
        self.callable_results.clear();
        self.state = PoolState::Empty;
    }

    /// Execute the pending wave and hand back its results without calling a handler.
    ///
    /// Returns `Ok(None)` unless the pool is waiting.
    pub async fn run_wave(&mut self) -> Result<Option<Wave>, PoolError> {
        if self.state != PoolState::Waiting {
            return Ok(None);
        }

        self.state = PoolState::Executing;
        let tasks = std::mem::take(&mut self.tasks);
        let ids = std::mem::take(&mut self.ids);
        let kind = self.kind.take().unwrap_or_default();
        debug!(requests = tasks.len(), %kind, "starting wave");

        let results = match kind {
            TransportKind::Async => self.execute_concurrent(tasks, ids).await,
            TransportKind::Plain => Ok(self.execute_sequential(tasks, ids).await),
        };

        match results {
            Ok(results) => {
                self.state = PoolState::Completed;
                Ok(Some(Wave { results }))
            }
            Err(err) => {
                self.state = PoolState::Empty;
                Err(err)
            }
        }
    }

    /// Execute the pending wave, pass it to `handler`, and log the handler's output.
    ///
    /// A no-op returning `Ok(None)` unless the pool is waiting.
    pub async fn start<H>(&mut self, handler: &mut H) -> Result<Option<&T>, PoolError>
    where
        H: CompletionHandler<Output = T> + ?Sized,
    {
        let Some(wave) = self.run_wave().await? else {
            return Ok(None);
        };

        let output = handler.on_complete(&wave).await;
        self.results = wave.results;
        self.callable_results.push(output);
        Ok(self.callable_results.last())
    }

    async fn execute_sequential(
        &self,
        tasks: Vec<RequestDescriptor>,
        ids: Vec<RequestId>,
    ) -> Vec<Completed> {
        let mut results = Vec::with_capacity(tasks.len());
        for (request, id) in tasks.into_iter().zip(ids) {
            let outcome = self.transport.send(&request).await;
            results.push(Completed {
                id,
                url: request.url,
                outcome,
            });
        }
        results
    }

    async fn execute_concurrent(
        &self,
        tasks: Vec<RequestDescriptor>,
        ids: Vec<RequestId>,
    ) -> Result<Vec<Completed>, PoolError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set = tokio::task::JoinSet::new();

        for (request, id) in tasks.into_iter().zip(ids) {
            let transport = self.transport.clone();
            let sem = semaphore.clone();

            join_set.spawn(async move {
                let _permit = sem.acquire_owned().await;
                let outcome = transport.send(&request).await;
                Completed {
                    id,
                    url: request.url,
                    outcome,
                }
            });
        }

        let mut results = Vec::with_capacity(join_set.len());
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(completed) => results.push(completed),
                Err(join_err) => {
                    join_set.abort_all();
                    return Err(PoolError::TaskPanicked(join_err.to_string()));
                }
            }
        }
        Ok(results)
    }
}

/// Combine two pools into a fresh one holding both sets of tasks and results.
///
/// The merged state is the lower of the two, capped at `Waiting`; a pool that
/// holds pending tasks is never `Empty`.
pub fn merge<T>(a: TaskPool<T>, b: TaskPool<T>) -> Result<TaskPool<T>, PoolError> {
    let kind = match (a.kind, b.kind) {
        (Some(x), Some(y)) if x != y => {
            return Err(PoolError::TypeKindMismatch {
                expected: x,
                found: y,
            })
        }
        (x, y) => x.or(y),
    };

    let mut state = a.state.min(b.state).min(PoolState::Waiting);
    let mut tasks = a.tasks;
    tasks.extend(b.tasks);
    if !tasks.is_empty() && state == PoolState::Empty {
        state = PoolState::Waiting;
    }
    let mut ids = a.ids;
    ids.extend(b.ids);
    let mut results = a.results;
    results.extend(b.results);
    let mut callable_results = a.callable_results;
    callable_results.extend(b.callable_results);

    Ok(TaskPool {
        transport: a.transport,
        max_concurrency: a.max_concurrency.max(b.max_concurrency),
        tasks,
        ids,
        kind,
        state,
        results,
        callable_results,
    })
}

impl<T> fmt::Debug for TaskPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskPool")
            .field("state", &self.state)
            .field("kind", &self.kind)
            .field("pending", &self.tasks.len())
            .field("results", &self.results.len())
            .field("callable_results", &self.callable_results.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::ScriptedTransport;
    use crate::RawResponse;
    use vkfan_core::HttpMethod;

    struct CountResults {
        calls: usize,
    }

    #[async_trait]
    impl CompletionHandler for CountResults {
        type Output = usize;

        async fn on_complete(&mut self, wave: &Wave) -> usize {
            self.calls += 1;
            wave.len()
        }
    }

    fn request(kind: TransportKind, url: &str) -> RequestDescriptor {
        RequestDescriptor::new(kind, HttpMethod::Get, url)
    }

    fn echo_transport() -> Arc<ScriptedTransport> {
        Arc::new(ScriptedTransport::new(|req| {
            Ok(RawResponse::new(200, req.url.clone()))
        }))
    }

    #[tokio::test]
    async fn lifecycle_runs_through_all_states() {
        let mut pool: TaskPool<usize> = TaskPool::new(echo_transport());
        let mut handler = CountResults { calls: 0 };
        assert_eq!(pool.state(), PoolState::Empty);

        let ids = pool
            .add(vec![request(TransportKind::Async, "a"), request(TransportKind::Async, "b")])
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(pool.state(), PoolState::Waiting);

        let out = pool.start(&mut handler).await.unwrap();
        assert_eq!(out, Some(&2));
        assert_eq!(pool.state(), PoolState::Completed);
        assert!(pool.tasks().is_empty());
        assert_eq!(pool.kind(), None);
        assert_eq!(pool.results().len(), 2);

        pool.add(vec![request(TransportKind::Async, "c")]).unwrap();
        assert_eq!(pool.state(), PoolState::Waiting);
        assert!(pool.results().is_empty());

        pool.start(&mut handler).await.unwrap();
        assert_eq!(handler.calls, 2);
        assert_eq!(pool.callable_results(), &[2, 1]);
    }

    #[tokio::test]
    async fn start_without_tasks_is_noop() {
        let mut pool: TaskPool<usize> = TaskPool::new(echo_transport());
        let mut handler = CountResults { calls: 0 };
        assert!(pool.start(&mut handler).await.unwrap().is_none());
        assert_eq!(handler.calls, 0);
        assert_eq!(pool.state(), PoolState::Empty);
    }

    #[test]
    fn mismatched_kind_is_rejected_atomically() {
        let mut pool: TaskPool = TaskPool::new(echo_transport());
        pool.add(vec![request(TransportKind::Async, "a")]).unwrap();

        let err = pool
            .add(vec![request(TransportKind::Plain, "b")])
            .unwrap_err();
        assert!(matches!(
            err,
            PoolError::TypeKindMismatch {
                expected: TransportKind::Async,
                found: TransportKind::Plain
            }
        ));
        assert_eq!(pool.tasks().len(), 1);
        assert_eq!(pool.ids().len(), 1);
    }

    #[test]
    fn mixed_batch_is_rejected() {
        let mut pool: TaskPool = TaskPool::new(echo_transport());
        let err = pool
            .add(vec![request(TransportKind::Plain, "a"), request(TransportKind::Async, "b")])
            .unwrap_err();
        assert!(matches!(err, PoolError::TypeKindMismatch { .. }));
        assert_eq!(pool.state(), PoolState::Empty);
        assert!(pool.tasks().is_empty());
    }

    #[tokio::test]
    async fn drained_pool_accepts_other_kind() {
        let mut pool: TaskPool = TaskPool::new(echo_transport());
        pool.add(vec![request(TransportKind::Async, "a")]).unwrap();
        pool.run_wave().await.unwrap();
        pool.add(vec![request(TransportKind::Plain, "b")]).unwrap();
        assert_eq!(pool.kind(), Some(TransportKind::Plain));
    }

    #[tokio::test]
    async fn wave_ids_match_submission_ids() {
        let mut pool: TaskPool = TaskPool::new(echo_transport());
        let ids = pool
            .add(vec![request(TransportKind::Async, "a"), request(TransportKind::Async, "b")])
            .unwrap();
        let wave = pool.run_wave().await.unwrap().unwrap();
        for completed in &wave.results {
            let pos = ids.iter().position(|id| *id == completed.id).unwrap();
            let expected = if pos == 0 { "a" } else { "b" };
            assert_eq!(completed.outcome.as_ref().unwrap().body, expected);
        }
    }

    #[tokio::test]
    async fn async_results_follow_completion_order() {
        let transport = Arc::new(
            ScriptedTransport::new(|req| Ok(RawResponse::new(200, req.url.clone()))).with_delay(
                |req| {
                    if req.url == "slow" {
                        Duration::from_millis(150)
                    } else {
                        Duration::ZERO
                    }
                },
            ),
        );
        let mut pool: TaskPool = TaskPool::new(transport);
        pool.add(vec![request(TransportKind::Async, "slow"), request(TransportKind::Async, "fast")])
            .unwrap();
        let wave = pool.run_wave().await.unwrap().unwrap();
        let urls: Vec<&str> = wave.results.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["fast", "slow"]);
    }

    #[tokio::test]
    async fn plain_results_follow_submission_order() {
        let transport = Arc::new(
            ScriptedTransport::new(|req| Ok(RawResponse::new(200, req.url.clone())))
                .with_delay(|req| if req.url == "slow" { Duration::from_millis(50) } else { Duration::ZERO }),
        );
        let mut pool: TaskPool = TaskPool::new(transport.clone());
        pool.add(vec![request(TransportKind::Plain, "slow"), request(TransportKind::Plain, "fast")])
            .unwrap();
        let wave = pool.run_wave().await.unwrap().unwrap();
        let urls: Vec<&str> = wave.results.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["slow", "fast"]);
        assert_eq!(transport.sent_count(), 2);
    }

    #[test]
    fn merge_concatenates_and_caps_state() {
        let transport = echo_transport();
        let mut a: TaskPool = TaskPool::new(transport.clone());
        let b: TaskPool = TaskPool::new(transport.clone());
        a.add(vec![request(TransportKind::Async, "a")]).unwrap();

        let merged = merge(a, b).unwrap();
        assert_eq!(merged.tasks().len(), 1);
        assert_eq!(merged.state(), PoolState::Waiting);
        assert_eq!(merged.kind(), Some(TransportKind::Async));

        let empty = merge::<()>(TaskPool::new(transport.clone()), TaskPool::new(transport))
            .unwrap();
        assert_eq!(empty.state(), PoolState::Empty);
        assert_eq!(empty.kind(), None);
    }

    #[test]
    fn merge_rejects_conflicting_kinds() {
        let transport = echo_transport();
        let mut a: TaskPool = TaskPool::new(transport.clone());
        let mut b: TaskPool = TaskPool::new(transport);
        a.add(vec![request(TransportKind::Async, "a")]).unwrap();
        b.add(vec![request(TransportKind::Plain, "b")]).unwrap();
        assert!(matches!(merge(a, b), Err(PoolError::TypeKindMismatch { .. })));
    }

    #[tokio::test]
    async fn transport_failures_are_kept_per_request() {
        let transport = Arc::new(ScriptedTransport::new(|req| {
            if req.url == "bad" {
                Err(crate::TransportError::Other("connection reset".into()))
            } else {
                Ok(RawResponse::new(200, "{}"))
            }
        }));
        let mut pool: TaskPool = TaskPool::new(transport);
        pool.add(vec![request(TransportKind::Async, "bad"), request(TransportKind::Async, "ok")])
            .unwrap();
        let wave = pool.run_wave().await.unwrap().unwrap();
        assert_eq!(wave.len(), 2);
        assert_eq!(wave.results.iter().filter(|c| c.outcome.is_err()).count(), 1);
    }
}
