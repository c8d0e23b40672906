use thiserror::Error;
use vkfan_core::CoreError;
use vkfan_pool::PoolError;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// A successful response whose payload lacks an expected field.
    #[error("unexpected payload for {path}: {detail}")]
    Shape { path: String, detail: String },
}
