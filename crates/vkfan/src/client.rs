use std::sync::Arc;

use tracing::{debug, info};
use vkfan_core::{
    CoreError, CredentialPool, Ident, Params, QueryBuilder, QueryPath, RequestDescriptor,
    RouteTable,
};
use vkfan_pool::{HttpTransport, TaskPool, Transport};
use vkfan_query::{CallOptions, Dispatcher, HandlerRegistry, QueryError, ResultTree};

use crate::facade::{Facade, Friends, Groups, Users, Wall};
use crate::{ClientConfig, ClientError};

/// Requests for one façade call plus the options its handlers need.
///
/// Several prepared calls can be combined with [`VkClient::execute_all`] so
/// they share one first wave.
#[derive(Debug, Clone, Default)]
pub struct PreparedCall {
    pub requests: Vec<RequestDescriptor>,
    pub options: CallOptions,
}

impl PreparedCall {
    pub fn new(requests: Vec<RequestDescriptor>, options: CallOptions) -> Self {
        Self { requests, options }
    }

    pub fn join(&mut self, other: PreparedCall) {
        self.requests.extend(other.requests);
        self.options.merge(other.options);
    }
}

struct Inner {
    builder: QueryBuilder,
    registry: Arc<HandlerRegistry>,
    transport: Arc<dyn Transport>,
    max_concurrency: usize,
}

/// Entry point to the API. Cheap to clone; clones share credentials and transport.
#[derive(Clone)]
pub struct VkClient {
    inner: Arc<Inner>,
}

impl VkClient {
    /// Client talking HTTP through reqwest.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut http = HttpTransport::builder()
            .user_agent(concat!("vkfan/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            http = http.timeout(timeout);
        }
        Self::with_transport(config, Arc::new(http.build()?))
    }

    pub fn with_transport(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        let credentials = CredentialPool::new(config.tokens.iter().map(String::as_str))?;
        let builder = QueryBuilder::new(
            Arc::new(config.route_table()),
            Arc::new(credentials),
            config.base_params(),
        )
        .with_kind(config.transport)
        .with_timeout(config.timeout());

        debug!(
            tokens = config.tokens.len(),
            transport = %config.transport,
            max_concurrency = config.max_concurrency,
            "client ready"
        );
        Ok(Self {
            inner: Arc::new(Inner {
                builder,
                registry: Arc::new(HandlerRegistry::standard()),
                transport,
                max_concurrency: config.max_concurrency.max(1),
            }),
        })
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub fn groups(&self) -> Groups<'_> {
        Groups::new(self)
    }

    pub fn friends(&self) -> Friends<'_> {
        Friends::new(self)
    }

    pub fn wall(&self) -> Wall<'_> {
        Wall::new(self)
    }

    /// Façade for an API section by name, case-insensitive.
    pub fn facade(&self, name: &str) -> Result<Facade<'_>, ClientError> {
        match name.to_ascii_lowercase().as_str() {
            "users" => Ok(Facade::Users(self.users())),
            "groups" => Ok(Facade::Groups(self.groups())),
            "friends" => Ok(Facade::Friends(self.friends())),
            "wall" => Ok(Facade::Wall(self.wall())),
            _ => Err(CoreError::InvalidRoute(name.to_string()).into()),
        }
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.inner.builder
    }

    pub fn routes(&self) -> &RouteTable {
        self.inner.builder.routes()
    }

    /// Any routed `{entity}.{submethod}` by name, returning the whole result tree.
    ///
    /// Fails with `InvalidRoute` before any request is made when the route or
    /// its handler is unknown.
    pub async fn call(
        &self,
        entity: &str,
        submethod: &str,
        ids: &[Ident],
        params: &Params,
    ) -> Result<ResultTree, ClientError> {
        let path = self.routed(entity, submethod)?;
        let requests = self.inner.builder.build(&path, ids, None, params)?;
        self.execute(PreparedCall::new(requests, CallOptions::new()))
            .await
    }

    /// Route and handler for `entity.submethod`, or `InvalidRoute`.
    pub fn routed(&self, entity: &str, submethod: &str) -> Result<QueryPath, ClientError> {
        let path = QueryPath::new(entity, submethod);
        if !self.routes().contains(&path) || !self.inner.registry.contains(&path) {
            return Err(CoreError::InvalidRoute(path.to_string()).into());
        }
        Ok(path)
    }

    pub async fn execute_all(
        &self,
        calls: impl IntoIterator<Item = PreparedCall>,
    ) -> Result<ResultTree, ClientError> {
        let mut joined = PreparedCall::default();
        for call in calls {
            joined.join(call);
        }
        self.execute(joined).await
    }

    /// Run a prepared call through every wave it spawns.
    pub async fn execute(&self, call: PreparedCall) -> Result<ResultTree, ClientError> {
        let inner = &self.inner;
        let initial = call.requests.len();

        let mut pool: TaskPool<Result<ResultTree, QueryError>> =
            TaskPool::new(inner.transport.clone()).with_max_concurrency(inner.max_concurrency);
        pool.add(call.requests)?;

        let mut dispatcher = Dispatcher::new(
            inner.registry.clone(),
            inner.builder.clone(),
            call.options,
            inner.transport.clone(),
        )
        .with_max_concurrency(inner.max_concurrency);
        pool.start(&mut dispatcher).await?;

        match pool.take_last_result() {
            Some(result) => {
                let tree = result?;
                info!(requests = initial, waves = dispatcher.waves(), "call finished");
                Ok(tree)
            }
            None => Ok(ResultTree::seeded(inner.registry.paths())),
        }
    }
}
