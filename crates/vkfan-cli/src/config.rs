use std::path::{Path, PathBuf};

use vkfan::ClientConfig;

/// `~/.vkfan/config.toml` unless a path was given.
pub fn resolve_path(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.join(".vkfan").join("config.toml"))
}

/// Config from `path` with the token environment variable applied.
pub fn load(path: &Path) -> anyhow::Result<ClientConfig> {
    Ok(ClientConfig::load(path)?.with_env())
}
