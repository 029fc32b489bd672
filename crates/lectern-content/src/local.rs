//! Content read from the deployed site directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::ContentError;
use crate::source::{validate_path, ContentSource, RawFile, WriteReceipt, WriteRequest};

/// Reads and writes content files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, ContentError> {
        Ok(self.root.join(validate_path(path)?))
    }
}

#[async_trait]
impl ContentSource for LocalSource {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn read(&self, path: &str) -> Result<RawFile, ContentError> {
        let full_path = self.resolve(path)?;

        tracing::debug!("Reading {}", full_path.display());

        match tokio::fs::read_to_string(&full_path).await {
            Ok(contents) => Ok(RawFile {
                path: path.to_string(),
                sha: None,
                contents,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ContentError::not_found(
                path,
                "the local content directory",
            )),
            Err(e) => Err(ContentError::Io {
                path: path.to_string(),
                source: e,
            }),
        }
    }

    async fn write(&self, request: &WriteRequest) -> Result<WriteReceipt, ContentError> {
        let full_path = self.resolve(&request.path)?;
        let io_error = |source| ContentError::Io {
            path: request.path.clone(),
            source,
        };

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(&full_path, &request.contents)
            .await
            .map_err(io_error)?;

        tracing::info!("Wrote {}", full_path.display());

        Ok(WriteReceipt { sha: None })
    }
}
