use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the result database lives and how much memory it may cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbSettings {
    pub path: PathBuf,
    /// redb page cache in bytes; `None` keeps redb's default.
    pub cache_size: Option<usize>,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("vkfan.redb"),
            cache_size: None,
        }
    }
}

impl DbSettings {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}
