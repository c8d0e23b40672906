use async_trait::async_trait;
use vkfan_core::{RequestDescriptor, RequestId};

use crate::TransportError;

/// Status and body of an HTTP exchange that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// One finished request of a wave. Network failures are kept, not raised.
#[derive(Debug)]
pub struct Completed {
    pub id: RequestId,
    /// Endpoint the request was sent to, without query string.
    pub url: String,
    pub outcome: Result<RawResponse, TransportError>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError>;
}
