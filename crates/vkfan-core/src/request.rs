use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Credential;

/// How the pool executes a request. A pool only holds one kind at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Dispatched together with the rest of its wave.
    #[default]
    Async,
    /// Sent one after another in submission order.
    Plain,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Async => f.write_str("async"),
            TransportKind::Plain => f.write_str("plain"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A single API call, ready to send.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub kind: TransportKind,
    pub method: HttpMethod,
    pub url: String,
    pub params: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub credential: Option<Credential>,
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn new(kind: TransportKind, method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            kind,
            method,
            url: url.into(),
            params: BTreeMap::new(),
            headers: BTreeMap::new(),
            credential: None,
            timeout: None,
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn params<'a>(mut self, params: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parameters as sent on the wire, with the credential as `access_token`.
    pub fn wire_params(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(cred) = &self.credential {
            out.push(("access_token".to_string(), cred.expose().to_string()));
        }
        out
    }

    /// URL-encoded `key=value&...` form of [`wire_params`](Self::wire_params).
    pub fn encoded_params(&self) -> String {
        self.wire_params()
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Full URL for GET requests; POST requests carry their params in the body.
    pub fn target_url(&self) -> String {
        match self.method {
            HttpMethod::Get if !self.params.is_empty() || self.credential.is_some() => {
                format!("{}?{}", self.url, self.encoded_params())
            }
            _ => self.url.clone(),
        }
    }
}
