//! Site server command.

use std::path::Path;

use anyhow::Result;
use lectern_server::{ServerConfig, SiteServer};

use super::load_config;

/// Run the site server.
pub async fn run(config_path: &Path, port: Option<u16>, host: Option<String>, open: bool) -> Result<()> {
    let site = load_config(config_path)?;

    let mut config = ServerConfig::from(&site);
    config.open = open;
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(host) = host {
        config.host = host;
    }

    let content_dir = config.content_root.join("content");
    if !content_dir.exists() {
        tracing::warn!(
            "{} does not exist. Run 'lectern init' to scaffold a site.",
            content_dir.display()
        );
    }

    tracing::info!("Starting site server on port {}", config.port);

    SiteServer::new(config).start().await?;

    Ok(())
}
