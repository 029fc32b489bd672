//! Content source abstraction.

use std::sync::Arc;

use async_trait::async_trait;

use crate::connection::SourceConnection;
use crate::error::ContentError;
use crate::github::GithubSource;
use crate::local::LocalSource;

/// Raw contents of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    /// Path relative to the source root
    pub path: String,

    /// Blob id of this revision, if the source tracks one
    pub sha: Option<String>,

    /// File contents
    pub contents: String,
}

/// A request to persist one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    /// Path relative to the source root
    pub path: String,

    /// New file contents
    pub contents: String,

    /// Blob id the edit was based on
    pub sha: Option<String>,

    /// Commit message
    pub message: String,
}

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Blob id of the new revision, if the source tracks one
    pub sha: Option<String>,
}

/// A place content files live.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Source identifier (e.g., "local", "github")
    fn name(&self) -> &'static str;

    /// Read a file. A missing file is `ContentError::NotFound`.
    async fn read(&self, path: &str) -> Result<RawFile, ContentError>;

    /// Create or replace a file.
    async fn write(&self, request: &WriteRequest) -> Result<WriteReceipt, ContentError>;
}

/// Chooses the content source for a connection.
pub trait SourceProvider: Send + Sync {
    fn source_for(&self, connection: &SourceConnection) -> Arc<dyn ContentSource>;
}

/// Serves local connections from the deployed content and remote connections
/// from the GitHub contents API.
#[derive(Clone)]
pub struct DefaultSourceProvider {
    local: Arc<LocalSource>,
    client: reqwest::Client,
    api_base: String,
}

impl DefaultSourceProvider {
    pub fn new(local: LocalSource, api_base: impl Into<String>) -> Self {
        Self {
            local: Arc::new(local),
            client: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }
}

impl SourceProvider for DefaultSourceProvider {
    fn source_for(&self, connection: &SourceConnection) -> Arc<dyn ContentSource> {
        match connection {
            SourceConnection::Local => self.local.clone(),
            SourceConnection::Remote {
                repository,
                branch,
                credential,
            } => Arc::new(GithubSource::new(
                self.client.clone(),
                &self.api_base,
                repository,
                branch,
                credential.clone(),
            )),
        }
    }
}

/// Uses one source for every connection.
#[derive(Clone)]
pub struct FixedSourceProvider(pub Arc<dyn ContentSource>);

impl SourceProvider for FixedSourceProvider {
    fn source_for(&self, _connection: &SourceConnection) -> Arc<dyn ContentSource> {
        Arc::clone(&self.0)
    }
}

/// Check that a content path is relative and stays inside the source root.
pub fn validate_path(path: &str) -> Result<&str, ContentError> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if invalid {
        return Err(ContentError::InvalidPath(path.to_string()));
    }

    Ok(path)
}
