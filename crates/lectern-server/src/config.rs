//! Site configuration (site.toml).

use std::path::PathBuf;

use serde::Deserialize;

use lectern_content::DEFAULT_API_BASE;

/// Configuration file structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub github: GithubSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "default_title")]
    pub title: String,
    /// Directory containing `content/`
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Directory served under `/static`
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Mark the preview cookie `Secure` (serve over HTTPS)
    #[serde(default)]
    pub secure_cookies: bool,
    /// Secret the preview cookie is signed with. Without one a random key
    /// is used and preview sessions end when the server restarts.
    pub preview_secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubSettings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Where the external authentication flow starts
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
}

fn default_title() -> String {
    "Lectern".to_string()
}
fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}
fn default_auth_url() -> String {
    "/api/auth/github".to_string()
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            root: default_root(),
            static_dir: None,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            secure_cookies: false,
            preview_secret: None,
        }
    }
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            auth_url: default_auth_url(),
        }
    }
}
