use std::path::Path;

use anyhow::{Context, Result};
use thicket_sdk::PersistConfig;
use tracing::debug;

pub const CONFIG_FILE: &str = "thicket.toml";

/// Load `thicket.toml` from the data directory. A missing file means
/// defaults.
pub fn load_config(data_dir: &Path) -> Result<PersistConfig> {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(PersistConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<PersistConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}
