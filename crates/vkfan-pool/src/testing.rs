//! In-memory transport for exercising pools and dispatchers without a server.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use vkfan_core::RequestDescriptor;

use crate::transport::{RawResponse, Transport};
use crate::TransportError;

type Responder = dyn Fn(&RequestDescriptor) -> Result<RawResponse, TransportError> + Send + Sync;
type Delay = dyn Fn(&RequestDescriptor) -> Duration + Send + Sync;

/// Answers each request with a caller-supplied function and records what was sent.
pub struct ScriptedTransport {
    responder: Box<Responder>,
    delay: Option<Box<Delay>>,
    sent: Mutex<Vec<RequestDescriptor>>,
}

impl ScriptedTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&RequestDescriptor) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            delay: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Every request gets `{"response": <value>}` with status 200.
    pub fn ok_json(value: serde_json::Value) -> Self {
        let body = serde_json::json!({ "response": value }).to_string();
        Self::new(move |_| Ok(RawResponse::new(200, body.clone())))
    }

    /// Delay each response by a per-request duration before answering.
    pub fn with_delay<D>(mut self, delay: D) -> Self
    where
        D: Fn(&RequestDescriptor) -> Duration + Send + Sync + 'static,
    {
        self.delay = Some(Box::new(delay));
        self
    }

    pub fn sent(&self) -> Vec<RequestDescriptor> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(request)).await;
        }
        (self.responder)(request)
    }
}
