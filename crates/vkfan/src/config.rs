use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vkfan_core::query::DEFAULT_API_VERSION;
use vkfan_core::{BaseParams, RouteTable, TransportKind, API_URL};
use vkfan_pool::pool::DEFAULT_MAX_CONCURRENCY;
use vkfan_store::DbSettings;

use crate::ClientError;

/// Environment variable holding comma-separated tokens; replaces `tokens` when set.
pub const TOKEN_ENV: &str = "VKFAN_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub tokens: Vec<String>,
    pub api_version: String,
    pub api_url: String,
    pub headers: BTreeMap<String, String>,
    pub transport: TransportKind,
    pub timeout_secs: Option<u64>,
    pub max_concurrency: usize,
    /// Custom route table; the built-in VK table is used when absent.
    pub routes: Option<RouteTable>,
    pub store: Option<DbSettings>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            api_url: API_URL.to_string(),
            headers: BTreeMap::new(),
            transport: TransportKind::default(),
            timeout_secs: Some(30),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            routes: None,
            store: None,
        }
    }
}

impl ClientConfig {
    pub fn with_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ClientError> {
        toml::from_str(content).map_err(|e| ClientError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ClientError> {
        toml::to_string_pretty(self).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ClientError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn save(&self, path: &Path) -> Result<(), ClientError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::Config(format!("{}: {e}", parent.display())))?;
        }
        std::fs::write(path, self.to_toml_string()?)
            .map_err(|e| ClientError::Config(format!("{}: {e}", path.display())))
    }

    /// Apply [`TOKEN_ENV`] if it is set and non-empty.
    pub fn with_env(mut self) -> Self {
        if let Ok(raw) = std::env::var(TOKEN_ENV) {
            self.apply_token_list(&raw);
        }
        self
    }

    pub(crate) fn apply_token_list(&mut self, raw: &str) {
        let tokens: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if !tokens.is_empty() {
            self.tokens = tokens;
        }
    }

    pub fn route_table(&self) -> RouteTable {
        self.routes
            .clone()
            .unwrap_or_else(|| RouteTable::vk(&self.api_url))
    }

    pub fn base_params(&self) -> BaseParams {
        BaseParams {
            version: self.api_version.clone(),
            headers: self.headers.clone(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
