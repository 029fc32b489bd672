//! CLI commands.

use std::fs;
use std::path::Path;

use anyhow::Result;
use lectern_server::SiteConfig;

pub mod check;
pub mod init;
pub mod serve;

/// Load configuration from the config file if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<SiteConfig> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: SiteConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(SiteConfig::default())
}
