use thiserror::Error;
use vkfan_core::TransportKind;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("transport kind mismatch: pool holds {expected} tasks, got {found}")]
    TypeKindMismatch {
        expected: TransportKind,
        found: TransportKind,
    },
    #[error("request task panicked: {0}")]
    TaskPanicked(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("{0}")]
    Other(String),
}
