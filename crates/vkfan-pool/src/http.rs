use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use tracing::debug;
use vkfan_core::{HttpMethod, RequestDescriptor};

use crate::transport::{RawResponse, Transport};
use crate::TransportError;

/// reqwest-backed transport. Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }

    fn request(&self, req: &RequestDescriptor) -> Result<reqwest::RequestBuilder, TransportError> {
        let mut builder = match req.method {
            HttpMethod::Get => self.client.get(req.target_url()),
            HttpMethod::Post => self.client.post(&req.url).form(&req.wire_params()),
        };

        for (name, value) in &req.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
            builder = builder.header(name, value);
        }

        if let Some(timeout) = req.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(builder)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, req: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        let builder = self.request(req)?;
        debug!(method = ?req.method, url = %req.url, "sending API request");

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        debug!(url = %req.url, status, bytes = body.len(), "received API response");

        Ok(RawResponse { status, body })
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: None,
        }
    }
}

impl HttpTransportBuilder {
    /// Default timeout; a descriptor's own timeout takes precedence.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpTransport, TransportError> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        Ok(HttpTransport {
            client: builder.build()?,
        })
    }
}
