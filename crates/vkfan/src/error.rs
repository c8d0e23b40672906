use thiserror::Error;
use vkfan_core::CoreError;
use vkfan_pool::{PoolError, TransportError};
use vkfan_query::QueryError;
use vkfan_store::StoreError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("config error: {0}")]
    Config(String),
}

impl ClientError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ClientError::Core(CoreError::InvalidParams(msg.into()))
    }
}
